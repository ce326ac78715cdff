//! OAuth 服务：将身份提供方的断言映射为本地用户与令牌
//!
//! 回调失败不会以错误返回，而是产生 `OAuthOutcome::Failed`，
//! 由处理器转换为跳转到前端登录页。

use crate::{
    auth::oauth::{generate_state, IdentityProvider, OAuthFailure, ProviderIdentity},
    config::OAuthConfig,
    error::AppError,
    models::{auth::OAuthCallbackParams, user::*},
    services::AuthService,
};
use std::sync::Arc;

/// 发起授权请求
#[derive(Debug)]
pub struct AuthorizationRequest {
    pub redirect_url: String,
    pub state: String,
}

/// 回调结果
#[derive(Debug)]
pub enum OAuthOutcome {
    /// 登录成功，跳转到前端应用
    Authenticated {
        user: User,
        token: String,
        redirect_url: String,
    },
    /// 登录失败，跳转到前端登录页
    Failed {
        reason: OAuthFailure,
        redirect_url: String,
    },
}

pub struct OAuthService {
    provider: Option<Arc<dyn IdentityProvider>>,
    auth_service: Arc<AuthService>,
    config: OAuthConfig,
}

impl OAuthService {
    pub fn new(
        provider: Option<Arc<dyn IdentityProvider>>,
        auth_service: Arc<AuthService>,
        config: OAuthConfig,
    ) -> Self {
        Self {
            provider,
            auth_service,
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// 生成 state 并构造授权地址
    pub fn begin(&self) -> Result<AuthorizationRequest, AppError> {
        let provider = self.provider.as_ref().ok_or(AppError::ProviderNotConfigured)?;

        let state = generate_state();
        let redirect_url = provider.authorization_url(&state)?;

        Ok(AuthorizationRequest {
            redirect_url,
            state,
        })
    }

    /// 处理回调
    ///
    /// `expected_state` 为发起时写入 cookie 的 state
    pub async fn complete(
        &self,
        params: OAuthCallbackParams,
        expected_state: Option<&str>,
    ) -> OAuthOutcome {
        match self.try_complete(params, expected_state).await {
            Ok((user, token)) => {
                metrics::counter!("auth_oauth_total", "outcome" => "success").increment(1);
                tracing::info!(user_id = user.user_id, "Google OAuth login succeeded");
                OAuthOutcome::Authenticated {
                    user,
                    token,
                    redirect_url: self.config.landing_url(),
                }
            }
            Err(reason) => self.fail(reason),
        }
    }

    /// 回调失败：计数并指向前端登录页
    pub fn fail(&self, reason: OAuthFailure) -> OAuthOutcome {
        metrics::counter!("auth_oauth_total", "outcome" => "failure").increment(1);
        tracing::warn!(reason = %reason, "Google OAuth login failed");
        OAuthOutcome::Failed {
            reason,
            redirect_url: self.config.failure_url(),
        }
    }

    async fn try_complete(
        &self,
        params: OAuthCallbackParams,
        expected_state: Option<&str>,
    ) -> Result<(User, String), OAuthFailure> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| OAuthFailure::ExchangeFailed("provider not configured".to_string()))?;

        if let Some(error) = params.error {
            return Err(OAuthFailure::ProviderError(error));
        }

        match (params.state.as_deref(), expected_state) {
            (Some(received), Some(expected)) if received == expected => {}
            _ => return Err(OAuthFailure::StateMismatch),
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(OAuthFailure::MissingCode)?;

        let identity = provider.exchange(&code).await?;
        if identity.email.trim().is_empty() {
            return Err(OAuthFailure::MissingEmail);
        }

        let user = self.resolve_user(&identity).await?;

        let token = self
            .auth_service
            .issue_extended(&user)
            .map_err(|e| OAuthFailure::Account(e.to_string()))?;

        Ok((user, token))
    }

    /// 按邮箱关联已有账户，不存在则创建
    async fn resolve_user(&self, identity: &ProviderIdentity) -> Result<User, OAuthFailure> {
        let existing = self
            .auth_service
            .find_user(&identity.email)
            .await
            .map_err(|e| OAuthFailure::Account(e.to_string()))?;

        match existing {
            Some(user) => {
                if !self.config.link_accounts_by_email && user.provider() != AuthProvider::Google {
                    return Err(OAuthFailure::LinkingDisabled);
                }
                tracing::debug!(user_id = user.user_id, "Reusing existing account for OAuth login");
                Ok(user)
            }
            None => {
                let created = self
                    .auth_service
                    .create_oauth_user(&identity.email, &identity.display_name())
                    .await;

                match created {
                    Ok(user) => {
                        tracing::info!(user_id = user.user_id, "Created account via Google OAuth");
                        Ok(user)
                    }
                    // 并发的首次登录：另一请求已创建该用户
                    Err(AppError::EmailTaken) => self
                        .auth_service
                        .find_user(&identity.email)
                        .await
                        .map_err(|e| OAuthFailure::Account(e.to_string()))?
                        .ok_or_else(|| OAuthFailure::Account("user vanished".to_string())),
                    Err(e) => Err(OAuthFailure::Account(e.to_string())),
                }
            }
        }
    }
}
