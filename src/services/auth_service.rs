//! 认证服务：登录、注册、请求认证

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher, session},
    error::AppError,
    models::{auth::*, user::*},
    repository::UserRepository,
};
use axum::http::HeaderMap;
use std::sync::Arc;

/// 登录或注册成功的结果
#[derive(Debug)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
    /// 令牌是否为 7 天长效令牌
    pub extended: bool,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            users,
            jwt_service,
            hasher: PasswordHasher::new(),
        }
    }

    /// 从请求头认证并解析出用户
    ///
    /// 令牌必须存在、签名有效、未过期，且 subject 对应的用户仍然存在
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, AppError> {
        let token = session::extract_token(headers).ok_or(AppError::Unauthenticated)?;

        let email = self.jwt_service.validate(&token)?;

        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            tracing::debug!(%email, "Token subject no longer exists");
            AppError::UserNotFound
        })?;

        Ok(user)
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<IssuedSession, AppError> {
        let user = self.users.find_by_email(&req.email).await?;

        // 邮箱不存在与密码错误返回相同的错误
        let user = match user {
            Some(user) if self.hasher.verify(&req.password, &user.password_hash) => user,
            _ => {
                metrics::counter!("auth_login_total", "outcome" => "failure").increment(1);
                tracing::info!("Login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.jwt_service.issue(&user.email, req.remember_me)?;

        metrics::counter!("auth_login_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = user.user_id, remember_me = req.remember_me, "User logged in");

        Ok(IssuedSession {
            user,
            token,
            extended: req.remember_me,
        })
    }

    /// 用户注册
    pub async fn register(&self, req: RegisterRequest) -> Result<IssuedSession, AppError> {
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let new_user = NewUser {
            email: req.email,
            password_hash: self.hasher.hash(&req.password)?,
            display_name: req.display_name,
            auth_provider: AuthProvider::Password,
        };

        // 并发注册时存储层的唯一约束仍会返回 EmailTaken
        let user = self.users.create(&new_user).await?;
        let token = self.jwt_service.issue(&user.email, false)?;

        metrics::counter!("auth_register_total").increment(1);
        tracing::info!(user_id = user.user_id, "User registered");

        Ok(IssuedSession {
            user,
            token,
            extended: false,
        })
    }

    /// 按邮箱查找用户
    pub async fn find_user(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users.find_by_email(email).await
    }

    /// 为 OAuth 用户创建账户（随机密码，无法用密码登录）
    pub async fn create_oauth_user(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<User, AppError> {
        let random_password = PasswordHasher::random_password();

        let new_user = NewUser {
            email: email.to_string(),
            password_hash: self.hasher.hash(&random_password)?,
            display_name: display_name.to_string(),
            auth_provider: AuthProvider::Google,
        };

        self.users.create(&new_user).await
    }

    /// 签发 7 天长效令牌
    pub fn issue_extended(&self, user: &User) -> Result<String, AppError> {
        self.jwt_service.issue(&user.email, true)
    }
}
