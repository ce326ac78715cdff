//! PostgreSQL 连接池
//! 启动时建池并执行迁移；/ready 通过带超时的探测查询判断数据库可用性

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::time::{Duration, Instant};

/// 连接上报给 PostgreSQL 的 application_name，便于在 pg_stat_activity 中识别
pub const APPLICATION_NAME: &str = "adoption-api";

/// 就绪检查的上限，超过即视为不可用
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// 解析连接串并附加应用名
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DbError> {
    config
        .url
        .expose_secret()
        .parse::<PgConnectOptions>()
        .map(|options| options.application_name(APPLICATION_NAME))
        .map_err(|e| DbError::InvalidUrl(e.to_string()))
}

/// 不含凭据的连接目标，用于日志
pub fn describe_target(options: &PgConnectOptions) -> String {
    format!(
        "{}:{}/{}",
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or("postgres")
    )
}

/// 创建连接池；连接失败时启动中止
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let options = connect_options(config)?;
    let target = describe_target(&options);

    tracing::debug!(%target, "Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect_with(options)
        .await
        .map_err(|e| {
            tracing::error!(%target, error = %e, "Database connection failed");
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        %target,
        max_connections = config.max_connections,
        "Database pool ready"
    );

    Ok(pool)
}

/// 执行 ./migrations 下的迁移（users、locations、pets）
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Migration failed");
        DbError::MigrationFailed(e.to_string())
    })?;

    tracing::info!("Database schema is up to date");
    Ok(())
}

/// 就绪探测：`SELECT 1`，超过 HEALTH_CHECK_TIMEOUT 视为不可用
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    let start = Instant::now();

    match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await
    {
        Ok(Ok(_)) => HealthStatus::Healthy {
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            HealthStatus::Unhealthy(e.to_string())
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = HEALTH_CHECK_TIMEOUT.as_millis() as u64,
                "Database readiness check timed out"
            );
            HealthStatus::Unhealthy("timed out".to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy { latency_ms: u64 },
    Unhealthy(String),
}
