//! HTTP 中间件
//! 应用状态与请求追踪

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtService, oauth::GoogleProvider, IdentityProvider},
    config::AppConfig,
    error::AppError,
    repository::{
        LocationRepository, PetRepository, PgLocationRepository, PgPetRepository,
        PgUserRepository, UserRepository,
    },
    services::{AuthService, OAuthService},
};

/// 应用状态
///
/// 服务与仓储均以 Arc 共享，Clone 只是指针拷贝
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: sqlx::PgPool,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub oauth_service: Arc<OAuthService>,
    pub pets: Arc<dyn PetRepository>,
    pub locations: Arc<dyn LocationRepository>,
}

impl AppState {
    /// 组装服务
    pub fn new(
        config: AppConfig,
        db: sqlx::PgPool,
        users: Arc<dyn UserRepository>,
        pets: Arc<dyn PetRepository>,
        locations: Arc<dyn LocationRepository>,
        provider: Option<Arc<dyn IdentityProvider>>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let auth_service = Arc::new(AuthService::new(users, jwt_service.clone()));
        let oauth_service = Arc::new(OAuthService::new(
            provider,
            auth_service.clone(),
            config.oauth.clone(),
        ));

        Ok(Self {
            config,
            db,
            jwt_service,
            auth_service,
            oauth_service,
            pets,
            locations,
        })
    }

    /// 使用 PostgreSQL 仓储与 Google 身份提供方
    pub fn from_pool(config: AppConfig, db: sqlx::PgPool) -> Result<Self, AppError> {
        let provider = GoogleProvider::from_config(&config.oauth)?
            .map(|p| Arc::new(p) as Arc<dyn IdentityProvider>);

        Self::new(
            config,
            db.clone(),
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgPetRepository::new(db.clone())),
            Arc::new(PgLocationRepository::new(db)),
            provider,
        )
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    // 只记录路径，避免把 OAuth code 等查询参数写进日志
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            302 => "302",
            400 => "400",
            401 => "401",
            404 => "404",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
