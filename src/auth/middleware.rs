//! Authentication gate for protected routes

use crate::{error::AppError, middleware::AppState, models::user::User};
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user resolved from the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

// Reuses the user resolved by `require_auth`; authenticates on its own otherwise
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = state.auth_service.authenticate(&parts.headers).await?;
        Ok(CurrentUser(user))
    }
}

/// Must be authenticated.
///
/// Performs the full check (token present, signature, expiry, user exists)
/// and attaches the user to the request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state.auth_service.authenticate(req.headers()).await?;

    tracing::debug!(user_id = user.user_id, "Request authenticated");

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
