//! 领养地点的 HTTP 处理器

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::location::*,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

/// 列出地点（按名称排序）
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Location>>, AppError> {
    Ok(Json(state.locations.list().await?))
}

/// 创建地点
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<LocationRequest>,
) -> Result<Json<Location>, AppError> {
    req.validate()?;

    let location = state.locations.create(&req).await?;

    tracing::info!(
        location_id = location.location_id,
        user_id = user.user_id,
        "Location created"
    );

    Ok(Json(location))
}

/// 更新地点
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(location_id): Path<i64>,
    Json(req): Json<LocationRequest>,
) -> Result<Json<Location>, AppError> {
    req.validate()?;

    let location = state
        .locations
        .update(location_id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Location"))?;

    tracing::info!(location_id, user_id = user.user_id, "Location updated");

    Ok(Json(location))
}

/// 删除地点
/// 仍有宠物关联时拒绝删除
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(location_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if state.locations.find_by_id(location_id).await?.is_none() {
        return Err(AppError::not_found("Location"));
    }

    let pets_count = state.pets.count_by_location(location_id).await?;
    if pets_count > 0 {
        return Err(AppError::BadRequest(format!(
            "Cannot delete location. {} pet(s) are assigned to this location.",
            pets_count
        )));
    }

    state.locations.delete(location_id).await?;

    tracing::info!(location_id, user_id = user.user_id, "Location deleted");

    Ok(Json(json!({"ok": true, "message": "Location deleted successfully"})))
}
