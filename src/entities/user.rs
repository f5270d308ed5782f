//! User entity - A registered account.
//!
//! Passwords are stored as bcrypt hashes and never serialized.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role string granting access to admin routes
pub const ROLE_ADMIN: &str = "admin";
/// Role string for regular accounts
pub const ROLE_USER: &str = "user";

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub full_name: String,
    /// Login email, unique across all accounts
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// `"admin"` or `"user"`
    pub role: String,
    /// Soft delete flag
    #[serde(skip_serializing, default)]
    pub is_deleted: bool,
    /// When the account was created
    pub created_at: DateTime,
    /// When the account was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Whether this account may use admin routes.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Users have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
