//! Google OAuth (authorization-code flow) client
//!
//! The provider only proves identity. Mapping that identity onto a local
//! account lives in `services::oauth_service`.

use crate::{config::OAuthConfig, error::AppError};
use async_trait::async_trait;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const OAUTH_SCOPE: &str = "openid email profile";

const STATE_LEN: usize = 32;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Identity asserted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub email: String,
    pub name: Option<String>,
}

impl ProviderIdentity {
    /// Provider name, falling back to the email local part
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .unwrap_or("User")
                .to_string(),
        }
    }
}

/// Why an OAuth callback did not produce a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthFailure {
    #[error("provider returned error: {0}")]
    ProviderError(String),

    #[error("callback is missing the authorization code")]
    MissingCode,

    #[error("callback query is malformed: {0}")]
    MalformedCallback(String),

    #[error("state parameter does not match")]
    StateMismatch,

    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("no userinfo returned: {0}")]
    UserInfoUnavailable(String),

    #[error("provider did not assert an email")]
    MissingEmail,

    #[error("email belongs to a password account and linking is disabled")]
    LinkingDisabled,

    #[error("local account error: {0}")]
    Account(String),
}

/// Third-party identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider authorization endpoint with all query parameters applied
    fn authorization_url(&self, state: &str) -> Result<String, AppError>;

    /// Exchange an authorization code for the user's identity
    async fn exchange(&self, code: &str) -> Result<ProviderIdentity, OAuthFailure>;
}

/// Random CSRF state for the authorization request
pub fn generate_state() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
}

/// Google implementation over the OpenID Connect endpoints
pub struct GoogleProvider {
    client: Client,
    client_id: String,
    client_secret: Secret<String>,
    redirect_url: String,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleProvider {
    /// `None` when client id/secret are not configured
    pub fn from_config(config: &OAuthConfig) -> Result<Option<Self>, AppError> {
        if !config.is_configured() {
            return Ok(None);
        }

        let (Some(client_id), Some(client_secret)) =
            (config.google_client_id.clone(), config.google_client_secret.clone())
        else {
            return Ok(None);
        };

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            redirect_url = %config.redirect_url,
            "Google OAuth configured"
        );

        Ok(Some(Self {
            client,
            client_id,
            client_secret,
            redirect_url: config.redirect_url.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            userinfo_url: config.userinfo_url.clone(),
        }))
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, OAuthFailure> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthFailure::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthFailure::ExchangeFailed(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthFailure::ExchangeFailed(e.to_string()))?;

        Ok(token.access_token)
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, OAuthFailure> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthFailure::UserInfoUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthFailure::UserInfoUnavailable(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthFailure::UserInfoUnavailable(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("scope", OAUTH_SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid OAuth authorize URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange(&self, code: &str) -> Result<ProviderIdentity, OAuthFailure> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_userinfo(&access_token).await?;

        let email = info
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(OAuthFailure::MissingEmail)?;

        Ok(ProviderIdentity {
            email,
            name: info.name,
        })
    }
}
