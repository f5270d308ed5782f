//! Behavior event entity - A logged product-detail view.
//!
//! Events copy the product's category, name and attributes at view time so the
//! recommendation engine can aggregate them without joining back to products.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Behavior event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "behavior_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the viewed product
    pub product_id: i64,
    /// Category of the product when it was viewed
    pub category: String,
    /// Name of the product when it was viewed
    pub product_name: String,
    /// Attributes of the product when it was viewed
    pub attributes: String,
    /// When the view happened
    pub created_at: DateTime,
}

/// Defines relationships between `BehaviorEvent` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event references one product
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
