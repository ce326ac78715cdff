//! Business logic services layer

pub mod auth_service;
pub mod oauth_service;

pub use auth_service::{AuthService, IssuedSession};
pub use oauth_service::{AuthorizationRequest, OAuthOutcome, OAuthService};
