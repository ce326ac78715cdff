//! Authentication and authorization module

pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod password;
pub mod session;

pub use jwt::{Claims, JwtService, TokenError};
pub use middleware::{require_auth, CurrentUser};
pub use oauth::{GoogleProvider, IdentityProvider, OAuthFailure, ProviderIdentity};
pub use password::PasswordHasher;
pub use session::extract_token;
