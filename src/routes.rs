//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/auth/status", get(handlers::health::auth_status))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::get_current_user))
        .route("/auth/google/login", get(handlers::oauth::google_login))
        .route("/auth/google/callback", get(handlers::oauth::google_callback));

    // 只读资源
    let read_routes = Router::new()
        .route("/pets", get(handlers::pet::list_pets))
        .route("/pets/{id}", get(handlers::pet::get_pet))
        .route("/locations", get(handlers::location::list_locations));

    // 写操作需要认证
    let authenticated_routes = Router::new()
        .route("/pets", post(handlers::pet::create_pet))
        .route(
            "/pets/{id}",
            put(handlers::pet::update_pet).delete(handlers::pet::delete_pet),
        )
        .route("/pets/{id}/approve", patch(handlers::pet::approve_pet))
        .route("/locations", post(handlers::location::create_location))
        .route(
            "/locations/{id}",
            put(handlers::location::update_location).delete(handlers::location::delete_location),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::require_auth,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(read_routes)
        .merge(authenticated_routes)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// CORS：允许配置中的前端来源携带 cookie
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origin_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
