//! Google OAuth 处理器

use crate::{
    auth::{oauth::OAuthFailure, session},
    error::AppError,
    middleware::AppState,
    models::auth::OAuthCallbackParams,
    services::OAuthOutcome,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// 发起 Google 登录，302 到授权页
pub async fn google_login(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let request = state.oauth_service.begin()?;
    let secure = state.config.security.cookie_secure;

    found(
        &request.redirect_url,
        [session::oauth_state_cookie(&request.state, secure)],
    )
}

/// Google 回调
///
/// 永远以 302 结束：成功跳转到前端应用，失败跳转到登录页并带 error=oauth_failed。
/// 无法解析的查询串（例如重复的 code）同样按失败处理。
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<OAuthCallbackParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let secure = state.config.security.cookie_secure;
    let clear_state = session::clear_oauth_state_cookie(secure);

    let outcome = match query {
        Ok(Query(params)) => {
            let expected_state = session::read_cookie(&headers, session::OAUTH_STATE_COOKIE_NAME);
            state
                .oauth_service
                .complete(params, expected_state.as_deref())
                .await
        }
        Err(rejection) => state
            .oauth_service
            .fail(OAuthFailure::MalformedCallback(rejection.body_text())),
    };

    match outcome {
        OAuthOutcome::Authenticated {
            token,
            redirect_url,
            ..
        } => {
            let cookie =
                session::access_cookie(&token, session::EXTENDED_COOKIE_MAX_AGE_SECS, secure);
            found(&redirect_url, [clear_state, cookie])
        }
        OAuthOutcome::Failed { redirect_url, .. } => found(&redirect_url, [clear_state]),
    }
}

/// 302 Found，附带 Set-Cookie
fn found<const N: usize>(location: &str, cookies: [HeaderValue; N]) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| AppError::internal_error("redirect URL is not a valid header value"))?;

    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    headers.insert(LOCATION, location);
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }

    Ok(response)
}
