//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// CORS 允许的来源（逗号分隔）
    pub cors_origins: String,
}

impl ServerConfig {
    /// 解析后的 CORS 来源列表
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// Cookie 是否带 Secure 标记（生产环境 HTTPS 下应为 true）
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// Google OAuth client id（未设置时 OAuth 登录不可用）
    pub google_client_id: Option<String>,
    /// Google OAuth client secret
    pub google_client_secret: Option<Secret<String>>,
    /// 后端回调地址
    pub redirect_url: String,
    /// 前端地址（OAuth 完成后跳转）
    pub frontend_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// 按邮箱关联已有账户
    pub link_accounts_by_email: bool,
}

impl OAuthConfig {
    /// client id 与 secret 均已设置
    pub fn is_configured(&self) -> bool {
        let id_set = self
            .google_client_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        let secret_set = self
            .google_client_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().trim().is_empty());
        id_set && secret_set
    }

    /// OAuth 成功后的前端落地页
    pub fn landing_url(&self) -> String {
        format!("{}/pets", self.frontend_url.trim_end_matches('/'))
    }

    /// OAuth 失败后的前端登录页（带错误标记）
    pub fn failure_url(&self) -> String {
        format!(
            "{}/login?error=oauth_failed",
            self.frontend_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub oauth: OAuthConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:8000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.cors_origins", "http://localhost:5173")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.jwt_secret", "change-this-secret-in-production-min-32-chars!")?
            .set_default("security.cookie_secure", false)?
            .set_default("oauth.redirect_url", "http://localhost:8000/auth/google/callback")?
            .set_default("oauth.frontend_url", "http://localhost:5173")?
            .set_default("oauth.authorize_url", "https://accounts.google.com/o/oauth2/v2/auth")?
            .set_default("oauth.token_url", "https://oauth2.googleapis.com/token")?
            .set_default("oauth.userinfo_url", "https://openidconnect.googleapis.com/v1/userinfo")?
            .set_default("oauth.link_accounts_by_email", true)?;

        // 从环境变量加载配置（前缀为 ADOPTION_）
        settings = settings.add_source(
            Environment::with_prefix("ADOPTION")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证数据库连接池配置
        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证 OAuth 地址
        for (name, value) in [
            ("oauth.redirect_url", &self.oauth.redirect_url),
            ("oauth.frontend_url", &self.oauth.frontend_url),
            ("oauth.authorize_url", &self.oauth.authorize_url),
            ("oauth.token_url", &self.oauth.token_url),
            ("oauth.userinfo_url", &self.oauth.userinfo_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::Message(format!("{} is not a valid URL: {}", name, value)));
            }
        }

        Ok(())
    }
}
