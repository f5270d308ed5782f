//! Signed session tokens.
//!
//! Access and refresh tokens are HS256 JWTs carrying the user id and role. They
//! differ only in secret and lifetime, both taken from [`AuthConfig`].

use crate::{
    config::settings::AuthConfig,
    entities::user,
    errors::{Error, Result},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    /// Role at issue time
    pub role: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Not valid before (unix seconds)
    pub nbf: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Which of the two token kinds to issue or check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token sent with every request
    Access,
    /// Long-lived token used only to obtain new access tokens
    Refresh,
}

impl TokenKind {
    fn secret(self, config: &AuthConfig) -> &str {
        match self {
            Self::Access => &config.access_token_secret,
            Self::Refresh => &config.refresh_token_secret,
        }
    }

    /// Lifetime in minutes
    #[must_use]
    pub const fn max_age(self, config: &AuthConfig) -> i64 {
        match self {
            Self::Access => config.access_token_max_age,
            Self::Refresh => config.refresh_token_max_age,
        }
    }
}

/// Issues a signed token of `kind` for `user`.
pub fn issue_token(user: &user::Model, kind: TokenKind, config: &AuthConfig) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        role: user.role.clone(),
        iat: now,
        nbf: now,
        exp: now + kind.max_age(config) * 60,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(kind.secret(config).as_bytes()),
    )
    .map_err(Into::into)
}

/// Verifies signature, expiry and not-before of a token of `kind`.
///
/// # Errors
/// Every failure maps to [`Error::Unauthorized`].
pub fn validate_token(token: &str, kind: TokenKind, config: &AuthConfig) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_nbf = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(kind.secret(config).as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!("Rejected {:?} token: {}", kind, e);
        Error::unauthorized("Invalid or expired token")
    })
}
