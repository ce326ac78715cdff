//! 宠物管理的 HTTP 处理器

use crate::{
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::pet::*,
    repository::pet_repo::unknown_location,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

/// 列出宠物（最新在前）
pub async fn list_pets(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Pet>>, AppError> {
    Ok(Json(state.pets.list().await?))
}

/// 获取宠物详情
pub async fn get_pet(
    State(state): State<Arc<AppState>>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Pet>, AppError> {
    let pet = state
        .pets
        .find_by_id(pet_id)
        .await?
        .ok_or_else(|| AppError::not_found("Pet"))?;

    Ok(Json(pet))
}

/// 创建宠物
pub async fn create_pet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<PetRequest>,
) -> Result<Json<Pet>, AppError> {
    req.validate()?;
    ensure_location_exists(&state, req.location_id).await?;

    let pet = state.pets.create(&req).await?;

    tracing::info!(pet_id = pet.pet_id, user_id = user.user_id, "Pet created");

    Ok(Json(pet))
}

/// 更新宠物
pub async fn update_pet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(pet_id): Path<i64>,
    Json(req): Json<PetRequest>,
) -> Result<Json<Pet>, AppError> {
    req.validate()?;

    if state.pets.find_by_id(pet_id).await?.is_none() {
        return Err(AppError::not_found("Pet"));
    }
    ensure_location_exists(&state, req.location_id).await?;

    let pet = state
        .pets
        .update(pet_id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Pet"))?;

    tracing::info!(pet_id, user_id = user.user_id, "Pet updated");

    Ok(Json(pet))
}

/// 审核通过
pub async fn approve_pet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(pet_id): Path<i64>,
) -> Result<Json<Pet>, AppError> {
    let pet = state
        .pets
        .find_by_id(pet_id)
        .await?
        .ok_or_else(|| AppError::not_found("Pet"))?;

    if pet.status == STATUS_APPROVED {
        return Ok(Json(pet));
    }

    let pet = state
        .pets
        .approve(pet_id)
        .await?
        .ok_or_else(|| AppError::not_found("Pet"))?;

    tracing::info!(pet_id, user_id = user.user_id, "Pet approved");

    Ok(Json(pet))
}

/// 删除宠物
pub async fn delete_pet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(pet_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.pets.delete(pet_id).await? {
        return Err(AppError::not_found("Pet"));
    }

    tracing::info!(pet_id, user_id = user.user_id, "Pet deleted");

    Ok(Json(json!({"ok": true})))
}

async fn ensure_location_exists(state: &AppState, location_id: i64) -> Result<(), AppError> {
    if state.locations.find_by_id(location_id).await?.is_none() {
        return Err(AppError::BadRequest(unknown_location(location_id)));
    }
    Ok(())
}
