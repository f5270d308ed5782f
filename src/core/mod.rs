//! Core business logic.
//!
//! Every flow is generic over the repository traits in [`crate::store`], so it
//! can run against any store and knows nothing about HTTP.

/// Registration, login, and account management
pub mod account;
/// Product CRUD and search
pub mod catalog;
/// Single-unit purchases and the order ledger
pub mod purchase;
/// Related-product ranking
pub mod recommend;
/// Product view events
pub mod tracking;
