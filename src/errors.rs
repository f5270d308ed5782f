//! Unified error type for the storefront.
//!
//! Every layer (store, core flows, auth, HTTP) returns [`Result`]. The HTTP
//! layer turns an [`Error`] into a status code and a `{"error": ...}` body in
//! [`crate::api::response`].

use thiserror::Error;

/// Errors produced anywhere in the application.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any failure reported by the ORM or the underlying database
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The product does not exist or has been soft-deleted
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// The user does not exist or has been soft-deleted
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// The behavior log holds no other products in the same category
    #[error("No related products found for product {product_id}")]
    NoRelatedProducts {
        /// Product the recommendations were requested for
        product_id: i64,
    },

    /// Malformed request or a field that fails validation
    #[error("{message}")]
    Validation {
        /// Human readable reason
        message: String,
    },

    /// Price is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Missing or invalid credentials
    #[error("{message}")]
    Unauthorized {
        /// Human readable reason
        message: String,
    },

    /// Authenticated, but not allowed to perform the action
    #[error("{message}")]
    Forbidden {
        /// Human readable reason
        message: String,
    },

    /// The resource already exists
    #[error("{message}")]
    Conflict {
        /// Human readable reason
        message: String,
    },

    /// Password hashing or verification failed
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Token signing failed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// I/O failure (binding the listener, reading files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::Unauthorized`] with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::Forbidden`] with the given message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
