//! 密码哈希功能单元测试
//!
//! 测试 Argon2id 密码哈希和验证功能

use adoption_api::auth::password::PasswordHasher;

#[test]
fn test_password_hash_and_verify() {
    let hasher = PasswordHasher::new();
    let password = "TestPassword123!";

    let hash = hasher.hash(password).expect("Hashing should succeed");

    // PHC 格式，带 argon2id 标识
    assert!(hash.starts_with("$argon2id$"));
    assert!(hasher.verify(password, &hash));
}

#[test]
fn test_password_verify_with_wrong_password() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash("TestPassword123!").unwrap();

    assert!(!hasher.verify("WrongPassword123!", &hash));
}

#[test]
fn test_password_hash_different_each_time() {
    let hasher = PasswordHasher::new();
    let password = "TestPassword123!";

    let hash1 = hasher.hash(password).unwrap();
    let hash2 = hasher.hash(password).unwrap();

    // 随机盐
    assert_ne!(hash1, hash2);
    assert!(hasher.verify(password, &hash1));
    assert!(hasher.verify(password, &hash2));
}

#[test]
fn test_password_hash_unicode() {
    let hasher = PasswordHasher::new();
    let password = "密码测试Test123!🔒";

    let hash = hasher.hash(password).unwrap();

    assert!(hasher.verify(password, &hash));
    assert!(!hasher.verify("密码测试Test123🔒", &hash));
}

#[test]
fn test_verify_never_errors_on_garbage() {
    let hasher = PasswordHasher::new();

    assert!(!hasher.verify("secret", ""));
    assert!(!hasher.verify("secret", "not-a-hash"));
    assert!(!hasher.verify("secret", "$argon2id$v=19$m=19456,t=2,p=1$broken"));
}

#[test]
fn test_hash_from_other_parameters_still_verifies() {
    // 存储的哈希自带参数，验证时以存储的为准
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString},
        Algorithm, Argon2, Params, Version,
    };

    let params = Params::new(8192, 1, 1, None).unwrap();
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(b"legacy-pass", &salt)
        .unwrap()
        .to_string();

    assert!(PasswordHasher::new().verify("legacy-pass", &hash));
}

#[test]
fn test_random_password_is_unusable_guess() {
    let a = PasswordHasher::random_password();
    let b = PasswordHasher::random_password();

    assert_eq!(a.len(), 43);
    assert_ne!(a, b);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
}
