//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::{AppConfig, settings::MIN_BCRYPT_COST},
    entities,
    errors::Result,
    store::{EventRepository, NewEvent, NewProduct, NewUser, ProductRepository, SeaStore, UserRepository},
};

/// Creates a store over an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_store() -> Result<SeaStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(SeaStore::new(db))
}

/// Configuration for tests: cheap bcrypt cost and one admin email.
#[must_use]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.bcrypt_cost = MIN_BCRYPT_COST;
    config.admin_emails = vec![TEST_ADMIN_EMAIL.to_string()];
    config
}

/// Email that [`test_config`] treats as an admin account
pub const TEST_ADMIN_EMAIL: &str = "admin@example.com";

/// Password used for every account created by these helpers
pub const TEST_PASSWORD: &str = "password123";

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * price: 50.0
/// * inventory: 10
pub async fn create_test_product(
    store: &SeaStore,
    name: &str,
    category: &str,
) -> Result<entities::product::Model> {
    create_custom_product(store, name, category, 50.0, 10).await
}

/// Creates a test product with custom price and inventory.
pub async fn create_custom_product(
    store: &SeaStore,
    name: &str,
    category: &str,
    price: f64,
    inventory: i32,
) -> Result<entities::product::Model> {
    store
        .insert_product(NewProduct {
            category: category.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            attributes: String::new(),
            inventory,
        })
        .await
}

/// Records `count` views of `product` in the behavior log.
pub async fn record_views(
    store: &SeaStore,
    product: &entities::product::Model,
    count: usize,
) -> Result<()> {
    for _ in 0..count {
        store
            .insert_event(NewEvent {
                product_id: product.id,
                category: product.category.clone(),
                product_name: product.name.clone(),
                attributes: product.attributes.clone(),
            })
            .await?;
    }
    Ok(())
}

/// Creates a regular test user whose password is [`TEST_PASSWORD`].
pub async fn create_test_user(store: &SeaStore, email: &str) -> Result<entities::user::Model> {
    create_user_with_role(store, email, entities::user::ROLE_USER).await
}

/// Creates a test user with an explicit role.
pub async fn create_user_with_role(
    store: &SeaStore,
    email: &str,
    role: &str,
) -> Result<entities::user::Model> {
    store
        .insert_user(NewUser {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: crate::auth::password::hash_password(TEST_PASSWORD, MIN_BCRYPT_COST)?,
            role: role.to_string(),
        })
        .await
}

/// Router over a fresh in-memory store using [`test_config`].
///
/// The returned state is the one the router serves from, so tests can seed and
/// inspect rows through `state.store`.
pub async fn test_app() -> Result<(axum::Router, crate::state::SharedState)> {
    let state = crate::state::AppState::new(setup_test_store().await?, test_config());
    Ok((crate::api::router(std::sync::Arc::clone(&state)), state))
}

/// `Authorization` header value carrying a fresh access token for `user`.
pub fn bearer(user: &entities::user::Model) -> Result<String> {
    let token = crate::auth::token::issue_token(
        user,
        crate::auth::token::TokenKind::Access,
        &test_config().auth,
    )?;
    Ok(format!("Bearer {token}"))
}

/// Builds a request with an optional JSON body and optional bearer header.
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(axum::http::header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(axum::http::header::CONTENT_TYPE, "application/json");
            axum::body::Body::from(value.to_string())
        }
        None => axum::body::Body::empty(),
    };
    builder.body(body).unwrap_or_default()
}

/// Sends `request` through `app` and returns the status, headers, and JSON body.
pub async fn send(
    app: &axum::Router,
    request: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, axum::http::HeaderMap, serde_json::Value) {
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, headers, value)
}
