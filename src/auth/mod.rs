//! Authentication - password hashing, session tokens, and request extractors.

/// Extractors resolving a request to an account
pub mod extract;
/// bcrypt password hashing
pub mod password;
/// JWT issue and validation
pub mod token;

pub use extract::{AdminUser, AuthUser};

/// Cookie carrying the access token (http-only)
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie carrying the refresh token (http-only)
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
/// Script-readable cookie flagging a logged-in browser
pub const LOGGED_IN_COOKIE: &str = "logged_in";
