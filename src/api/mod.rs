//! HTTP interface.
//!
//! Handlers stay thin: they extract the caller and the input, call one flow in
//! [`crate::core`], and wrap the result in the JSON envelope from [`response`].

/// Catalog management, orders, and reports
pub mod admin;
/// Public catalog and purchases
pub mod products;
/// Envelopes, custom extractors, and error responses
pub mod response;
/// Registration, sessions, and profiles
pub mod users;

use crate::state::SharedState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Builds the application router with request tracing.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .merge(users::routes())
        .merge(products::routes())
        .merge(admin::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
