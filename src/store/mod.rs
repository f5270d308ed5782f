//! Persistence interfaces.
//!
//! Flows in [`crate::core`] never touch the ORM directly. They are generic over
//! these traits, one per entity, plus [`Store`] which can open a [`UnitOfWork`]
//! for operations that must succeed or fail together. [`SeaStore`] implements
//! all of them on top of `SeaORM`.

use crate::{
    entities::{behavior_event, order, product, user},
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::str::FromStr;

mod sea;

pub use sea::SeaStore;

/// Column a product search is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Creation time
    #[default]
    AddedDate,
    /// Unit price
    Price,
}

/// Direction of a product search ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "addedDate" => Ok(Self::AddedDate),
            "price" => Ok(Self::Price),
            _ => Err(Error::validation("Invalid sort option")),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::validation("Invalid sortOrder")),
        }
    }
}

/// Product search parameters
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Substring matched against product names; empty matches everything
    pub text: String,
    /// Ordering column
    pub sort_key: SortKey,
    /// Ordering direction
    pub sort_order: SortOrder,
}

/// Fields for a new product
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Catalog category
    pub category: String,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Opaque attribute string
    pub attributes: String,
    /// Initial stock
    pub inventory: i32,
}

/// Partial product update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    /// New category
    pub category: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// New attribute string
    pub attributes: Option<String>,
    /// New stock level
    pub inventory: Option<i32>,
}

/// Fields for a new order
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Purchased product
    pub product_id: i64,
    /// Units bought
    pub quantity: i32,
    /// Price charged
    pub total_price: f64,
    /// Buyer
    pub user_id: i64,
}

/// Fields for a new behavior event
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Viewed product
    pub product_id: i64,
    /// Product category at view time
    pub category: String,
    /// Product name at view time
    pub product_name: String,
    /// Product attributes at view time
    pub attributes: String,
}

/// Fields for a new user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// bcrypt hash
    pub password_hash: String,
    /// Account role
    pub role: String,
}

/// Partial user update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New display name
    pub full_name: Option<String>,
    /// New login email
    pub email: Option<String>,
    /// New bcrypt hash
    pub password_hash: Option<String>,
    /// New account role
    pub role: Option<String>,
}

/// Access to the product catalog. Soft-deleted products are never returned.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Point lookup of an active product.
    async fn find_product(&self, id: i64) -> Result<Option<product::Model>>;

    /// Active products among `ids`, in no particular order.
    async fn find_products(&self, ids: &[i64]) -> Result<Vec<product::Model>>;

    /// All active products ordered by id.
    async fn list_products(&self) -> Result<Vec<product::Model>>;

    /// Active products whose name contains the search text.
    async fn search_products(&self, query: &SearchQuery) -> Result<Vec<product::Model>>;

    /// Inserts a product and returns the stored row.
    async fn insert_product(&self, new: NewProduct) -> Result<product::Model>;

    /// Applies the present fields of `changes` to an active product.
    /// Returns `None` when no such product exists.
    async fn update_product(
        &self,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Option<product::Model>>;

    /// Marks an active product as deleted. Returns `None` when no such product exists.
    async fn soft_delete_product(&self, id: i64) -> Result<Option<product::Model>>;

    /// Atomically adds `delta` to the inventory of an active product and returns
    /// the updated row. Returns `None` when no such product exists.
    async fn adjust_inventory(&self, id: i64, delta: i32) -> Result<Option<product::Model>>;
}

/// Access to the order ledger.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Appends an order and returns the stored row.
    async fn insert_order(&self, new: NewOrder) -> Result<order::Model>;

    /// All orders, oldest first.
    async fn list_orders(&self) -> Result<Vec<order::Model>>;

    /// Orders for one product, oldest first.
    async fn orders_for_product(&self, product_id: i64) -> Result<Vec<order::Model>>;
}

/// Access to the behavior log.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Appends an event and returns the stored row.
    async fn insert_event(&self, new: NewEvent) -> Result<behavior_event::Model>;

    /// Every event recorded for products in `category`.
    async fn events_in_category(&self, category: &str) -> Result<Vec<behavior_event::Model>>;

    /// `(product_id, count)` for every product with at least one event, by product id.
    async fn count_events_by_product(&self) -> Result<Vec<(i64, i64)>>;

    /// Total number of recorded events.
    async fn count_events(&self) -> Result<u64>;
}

/// Access to user accounts. Soft-deleted users are never returned.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Point lookup of an active user.
    async fn find_user(&self, id: i64) -> Result<Option<user::Model>>;

    /// Lookup by email, including soft-deleted accounts so emails stay unique.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<user::Model>>;

    /// All active users ordered by id.
    async fn list_users(&self) -> Result<Vec<user::Model>>;

    /// Inserts a user and returns the stored row.
    async fn insert_user(&self, new: NewUser) -> Result<user::Model>;

    /// Applies the present fields of `changes`. Returns `None` when no such user exists.
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<user::Model>>;

    /// Marks an active user as deleted. Returns `None` when no such user exists.
    async fn soft_delete_user(&self, id: i64) -> Result<Option<user::Model>>;
}

/// A group of product and order writes that commit or roll back together.
///
/// Dropping a unit of work without calling either method must discard its writes.
#[async_trait]
pub trait UnitOfWork: ProductRepository + OrderRepository + Sized {
    /// Makes every write performed through this unit durable.
    async fn commit(self) -> Result<()>;

    /// Discards every write performed through this unit.
    async fn rollback(self) -> Result<()>;
}

/// Root persistence handle held by the application state.
#[async_trait]
pub trait Store: ProductRepository + OrderRepository + EventRepository + UserRepository {
    /// Unit of work type opened by [`Store::begin`]
    type Work: UnitOfWork;

    /// Opens a new unit of work.
    async fn begin(&self) -> Result<Self::Work>;
}
