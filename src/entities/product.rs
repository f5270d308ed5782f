//! Product entity - A catalog item that can be viewed, recommended and purchased.
//!
//! Products are created and edited by admins and carry a running inventory count.
//! Purchases decrement the inventory; deleting a product only sets `is_deleted`
//! so orders and behavior events that reference it stay meaningful.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Catalog category used for grouping and recommendations (e.g., "Books")
    pub category: String,
    /// Display name of the product
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Opaque attribute string (size, color, ...) copied into behavior events
    pub attributes: String,
    /// Units in stock. Purchases do not floor this, so it can go negative.
    pub inventory: i32,
    /// Soft delete flag - if true, product is hidden but data is preserved
    #[serde(skip_serializing, default)]
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    /// One product has many recorded views
    #[sea_orm(has_many = "super::behavior_event::Entity")]
    BehaviorEvents,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::behavior_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BehaviorEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
