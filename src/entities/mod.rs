//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod behavior_event;
pub mod order;
pub mod product;
pub mod user;

// Re-export specific types to avoid conflicts
pub use behavior_event::{
    Column as BehaviorEventColumn, Entity as BehaviorEvent, Model as BehaviorEventModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
