//! User repository (数据库访问层)

use super::map_unique_violation;
use crate::{error::AppError, models::user::*};
use async_trait::async_trait;
use sqlx::PgPool;

/// 用户存储
///
/// 邮箱唯一性由存储层保证：重复插入必须返回 `AppError::EmailTaken`
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据邮箱查找用户（区分大小写）
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// 创建用户
    async fn create(&self, new_user: &NewUser) -> Result<User, AppError>;
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name, is_admin, auth_provider)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING *
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.display_name)
        .bind(new_user.auth_provider.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }
}
