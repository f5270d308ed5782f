//! Request extractors for authenticated callers.
//!
//! [`AuthUser`] resolves the first valid access token (cookie first, then bearer
//! header) to a live account; [`AdminUser`] additionally requires the admin role as currently
//! stored, so demoting an account takes effect before its tokens expire.

use super::{
    ACCESS_TOKEN_COOKIE,
    token::{TokenKind, validate_token},
};
use crate::{
    entities::user,
    errors::{Error, Result},
    state::SharedState,
    store::UserRepository,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

/// An authenticated, non-deleted account
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

/// An authenticated account holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl AuthUser {
    /// Whether the caller may act on the account `user_id`.
    #[must_use]
    pub fn can_manage(&self, user_id: i64) -> bool {
        self.0.id == user_id || self.0.is_admin()
    }
}

/// Candidate access tokens in the order they are tried: cookie, then bearer header.
fn access_tokens(headers: &HeaderMap) -> Vec<String> {
    let cookie = CookieJar::from_headers(headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    cookie
        .into_iter()
        .chain(bearer)
        .filter(|token| !token.is_empty())
        .collect()
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        // A stale cookie must not shadow a valid bearer header
        let mut rejection = Error::unauthorized("You are not logged in");
        let mut claims = None;
        for token in access_tokens(&parts.headers) {
            match validate_token(&token, TokenKind::Access, &state.config.auth) {
                Ok(valid) => {
                    claims = Some(valid);
                    break;
                }
                Err(err) => rejection = err,
            }
        }
        let claims = claims.ok_or(rejection)?;

        let user = state.store.find_user(claims.sub).await?.ok_or_else(|| {
            debug!(user_id = claims.sub, "Token references a missing user");
            Error::unauthorized("The user belonging to this token no longer exists")
        })?;

        Ok(Self(user))
    }
}

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            debug!(user_id = user.id, "Rejected non-admin caller");
            return Err(Error::forbidden("User is not an admin"));
        }
        Ok(Self(user))
    }
}
