//! Token extraction from requests and `access_token` cookie construction.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};

/// Cookie carrying the bearer token for browser sessions
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie carrying the OAuth CSRF state between login and callback
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// Cookie max-age for a normal login (24 hours)
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24;

/// Cookie max-age for "remember me" and OAuth logins (7 days)
pub const EXTENDED_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// OAuth state cookie lifetime (10 minutes)
pub const OAUTH_STATE_MAX_AGE_SECS: i64 = 60 * 10;

/// Pull the bearer token out of a request.
///
/// The `Authorization` header wins; the `access_token` cookie is the fallback.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer_token(headers).or_else(|| read_cookie(headers, ACCESS_COOKIE_NAME))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Read a named cookie across all `Cookie` headers
///
/// RFC 6265 allows a cookie value wrapped in double quotes; the quotes are not part of the value.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, val)| unquote(val.trim()).to_string())
        .filter(|val| !val.is_empty())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Cookie max-age matching the login mode
pub fn cookie_max_age(extended: bool) -> i64 {
    if extended {
        EXTENDED_COOKIE_MAX_AGE_SECS
    } else {
        SESSION_COOKIE_MAX_AGE_SECS
    }
}

/// `Set-Cookie` value for the access token
pub fn access_cookie(token: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    build_cookie(ACCESS_COOKIE_NAME, token, max_age_secs, secure)
}

/// `Set-Cookie` value that deletes the access token
pub fn clear_access_cookie(secure: bool) -> HeaderValue {
    build_cookie(ACCESS_COOKIE_NAME, "", 0, secure)
}

pub fn oauth_state_cookie(state: &str, secure: bool) -> HeaderValue {
    build_cookie(OAUTH_STATE_COOKIE_NAME, state, OAUTH_STATE_MAX_AGE_SECS, secure)
}

pub fn clear_oauth_state_cookie(secure: bool) -> HeaderValue {
    build_cookie(OAUTH_STATE_COOKIE_NAME, "", 0, secure)
}

fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    // JWTs and the alphanumeric state are always visible ASCII
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| {
        tracing::error!(cookie = name, "Cookie value contains invalid header characters");
        HeaderValue::from_static("access_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    })
}
