//! 认证相关的 HTTP 处理器

use crate::{
    auth::{middleware::CurrentUser, session},
    error::AppError,
    middleware::AppState,
    models::{auth::*, user::UserResponse},
    services::IssuedSession,
};
use axum::{extract::State, http::header::SET_COOKIE, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let issued = state.auth_service.login(req).await?;

    Ok(session_response(&state, issued))
}

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let issued = state.auth_service.register(req).await?;

    Ok(session_response(&state, issued))
}

/// 登出
/// 仅清除 cookie，服务端没有会话状态
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = session::clear_access_cookie(state.config.security.cookie_secure);

    (
        [(SET_COOKIE, cookie)],
        Json(json!({"ok": true, "message": "Logged out successfully"})),
    )
}

/// 获取当前用户信息
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// 令牌同时写入 cookie 与响应体
fn session_response(state: &AppState, issued: IssuedSession) -> impl IntoResponse {
    let cookie = session::access_cookie(
        &issued.token,
        session::cookie_max_age(issued.extended),
        state.config.security.cookie_secure,
    );

    (
        [(SET_COOKIE, cookie)],
        Json(AuthResponse::bearer(UserResponse::from(issued.user), issued.token)),
    )
}
