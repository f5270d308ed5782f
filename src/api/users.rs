//! Account routes: registration, session cookies, and self-service profile edits.

use super::response::{AppJson, AppPath, Data, data};
use crate::{
    auth::{
        ACCESS_TOKEN_COOKIE, AuthUser, LOGGED_IN_COOKIE, REFRESH_TOKEN_COOKIE,
        token::{TokenKind, issue_token, validate_token},
    },
    config::settings::AuthConfig,
    core::account::{self, AccountChanges, NewAccount},
    entities::user,
    errors::{Error, Result},
    state::SharedState,
    store::UserRepository,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Registration body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    #[serde(alias = "fullname")]
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Login body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Partial profile update body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name
    #[serde(default, alias = "fullname")]
    pub full_name: Option<String>,
    /// New login email
    #[serde(default)]
    pub email: Option<String>,
    /// New plain-text password
    #[serde(default)]
    pub password: Option<String>,
}

/// Body returned by login and refresh
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Freshly issued access token
    pub access_token: String,
}

/// Body returned by logout
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `"success"`
    pub status: &'static str,
}

/// Routes mounted under `/users`
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh", post(refresh))
        .route("/users/logout", post(logout))
        .route("/users/{id}", get(get_user))
        .route("/users/update/{id}", patch(update_user))
        .route("/users/delete/{id}", delete(delete_user))
}

fn session_cookie(
    name: &'static str,
    value: String,
    minutes: i64,
    http_only: bool,
    config: &AuthConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .secure(config.secure_cookies)
        .max_age(time::Duration::minutes(minutes))
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

async fn register(
    State(state): State<SharedState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Data<user::Model>)> {
    let user = account::register(
        &state.store,
        NewAccount {
            full_name: body.full_name,
            email: body.email,
            password: body.password,
        },
        &state.config,
    )
    .await?;
    Ok((StatusCode::CREATED, data(user)))
}

async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<(CookieJar, Data<TokenResponse>)> {
    let user = account::authenticate(&state.store, &body.email, &body.password).await?;
    let auth = &state.config.auth;

    let access_token = issue_token(&user, TokenKind::Access, auth)?;
    let refresh_token = issue_token(&user, TokenKind::Refresh, auth)?;
    let access_age = TokenKind::Access.max_age(auth);

    let jar = jar
        .add(session_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token.clone(),
            access_age,
            true,
            auth,
        ))
        .add(session_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            TokenKind::Refresh.max_age(auth),
            true,
            auth,
        ))
        .add(session_cookie(
            LOGGED_IN_COOKIE,
            "true".to_string(),
            access_age,
            false,
            auth,
        ));

    info!("User {} logged in", user.id);
    Ok((jar, data(TokenResponse { access_token })))
}

async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Data<TokenResponse>)> {
    let auth = &state.config.auth;
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| Error::unauthorized("Could not refresh access token"))?;

    let claims = validate_token(&token, TokenKind::Refresh, auth)?;
    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| Error::unauthorized("The user belonging to this token no longer exists"))?;

    let access_token = issue_token(&user, TokenKind::Access, auth)?;
    let access_age = TokenKind::Access.max_age(auth);
    let jar = jar
        .add(session_cookie(
            ACCESS_TOKEN_COOKIE,
            access_token.clone(),
            access_age,
            true,
            auth,
        ))
        .add(session_cookie(
            LOGGED_IN_COOKIE,
            "true".to_string(),
            access_age,
            false,
            auth,
        ));

    Ok((jar, data(TokenResponse { access_token })))
}

async fn logout(jar: CookieJar) -> (CookieJar, Data<StatusResponse>) {
    let jar = jar
        .add(expired_cookie(ACCESS_TOKEN_COOKIE))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE))
        .add(expired_cookie(LOGGED_IN_COOKIE));
    (jar, data(StatusResponse { status: "success" }))
}

async fn get_user(
    State(state): State<SharedState>,
    _caller: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<Data<user::Model>> {
    Ok(data(account::get_user(&state.store, id).await?))
}

async fn update_user(
    State(state): State<SharedState>,
    caller: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> Result<Data<user::Model>> {
    if !caller.can_manage(id) {
        return Err(Error::forbidden("You can only update your own account"));
    }

    let user = account::update_user(
        &state.store,
        id,
        AccountChanges {
            full_name: body.full_name,
            email: body.email,
            password: body.password,
        },
        state.config.auth.bcrypt_cost,
    )
    .await?;
    Ok(data(user))
}

async fn delete_user(
    State(state): State<SharedState>,
    caller: AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<Data<user::Model>> {
    if !caller.can_manage(id) {
        return Err(Error::forbidden("You can only delete your own account"));
    }
    Ok(data(account::delete_user(&state.store, id).await?))
}
