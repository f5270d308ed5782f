//! Shared application state handed to every request handler.

use crate::{config::AppConfig, store::SeaStore};
use std::sync::Arc;

/// Immutable state shared by all requests
#[derive(Debug)]
pub struct AppState {
    /// Persistence handle
    pub store: SeaStore,
    /// Loaded configuration
    pub config: AppConfig,
}

/// State as stored in the router
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wraps the store and configuration for the router.
    #[must_use]
    pub fn new(store: SeaStore, config: AppConfig) -> SharedState {
        Arc::new(Self { store, config })
    }
}
