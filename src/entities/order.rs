//! Order entity - One completed purchase.
//!
//! Orders are append-only: created once per purchase and never updated.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the purchased product
    pub product_id: i64,
    /// Number of units bought (always 1 for the purchase endpoint)
    pub quantity: i32,
    /// Price charged, captured at purchase time
    pub total_price: f64,
    /// ID of the user who placed the order
    pub user_id: i64,
    /// When the order was created
    pub created_at: DateTime,
    /// Mirrors `created_at`; orders are never modified
    pub updated_at: DateTime,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
