//! Catalog business logic - Handles all product-related operations.
//!
//! This module provides functions for creating, retrieving, searching, updating, and
//! soft-deleting products. Input is validated here before it reaches the store: names
//! and categories must be non-empty, prices finite and non-negative, and stock levels
//! set by an admin non-negative. Purchases are the only path that may drive inventory
//! below zero (see [`crate::core::purchase`]).

use crate::{
    entities::product,
    errors::{Error, Result},
    store::{NewProduct, ProductChanges, ProductRepository, SearchQuery},
};
use tracing::{info, instrument};

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn checked_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(price)
}

fn checked_inventory(inventory: i32) -> Result<i32> {
    if inventory < 0 {
        return Err(Error::validation("Inventory cannot be negative"));
    }
    Ok(inventory)
}

/// Creates a new product after validating every field.
///
/// Category and name are trimmed; description and attributes are stored verbatim.
///
/// # Errors
/// Returns an error if:
/// - The category or name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The inventory is negative
/// - The database insert operation fails
#[instrument(skip(store))]
pub async fn create_product<S: ProductRepository>(
    store: &S,
    new: NewProduct,
) -> Result<product::Model> {
    let validated = NewProduct {
        category: required_text("Category", &new.category)?,
        name: required_text("Product name", &new.name)?,
        price: checked_price(new.price)?,
        inventory: checked_inventory(new.inventory)?,
        ..new
    };

    let product = store.insert_product(validated).await?;
    info!(
        "Added product '{}' (ID: {}) in category '{}'",
        product.name, product.id, product.category
    );
    Ok(product)
}

/// Retrieves an active product by its unique ID.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if the product does not exist or is deleted.
pub async fn get_product<S: ProductRepository>(store: &S, product_id: i64) -> Result<product::Model> {
    store
        .find_product(product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Retrieves all active products ordered by ID.
pub async fn list_products<S: ProductRepository>(store: &S) -> Result<Vec<product::Model>> {
    store.list_products().await
}

/// Builds a [`SearchQuery`] from raw query-string values.
///
/// `sort_by` defaults to `addedDate` and `sort_order` to `asc`.
///
/// # Errors
/// Returns [`Error::Validation`] for an unknown sort key or order.
pub fn parse_search(
    text: Option<&str>,
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> Result<SearchQuery> {
    Ok(SearchQuery {
        text: text.unwrap_or_default().trim().to_string(),
        sort_key: sort_by.unwrap_or("addedDate").parse()?,
        sort_order: sort_order.unwrap_or("asc").parse()?,
    })
}

/// Searches active products by name.
pub async fn search_products<S: ProductRepository>(
    store: &S,
    query: &SearchQuery,
) -> Result<Vec<product::Model>> {
    store.search_products(query).await
}

/// Applies a partial update to an active product.
///
/// Every field present in `changes` is validated the same way as on creation.
///
/// # Errors
/// Returns an error if:
/// - A present field fails validation
/// - The product does not exist or is already deleted
/// - The database update operation fails
#[instrument(skip(store))]
pub async fn update_product<S: ProductRepository>(
    store: &S,
    product_id: i64,
    changes: ProductChanges,
) -> Result<product::Model> {
    let validated = ProductChanges {
        category: changes
            .category
            .as_deref()
            .map(|c| required_text("Category", c))
            .transpose()?,
        name: changes
            .name
            .as_deref()
            .map(|n| required_text("Product name", n))
            .transpose()?,
        price: changes.price.map(checked_price).transpose()?,
        inventory: changes.inventory.map(checked_inventory).transpose()?,
        ..changes
    };

    let product = store
        .update_product(product_id, validated)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    info!("Updated product {}", product.id);
    Ok(product)
}

/// Soft deletes a product, preserving its orders and behavior events.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is already deleted
/// - The database update operation fails
#[instrument(skip(store))]
pub async fn delete_product<S: ProductRepository>(
    store: &S,
    product_id: i64,
) -> Result<product::Model> {
    let product = store
        .soft_delete_product(product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    info!("Soft-deleted product {}", product.id);
    Ok(product)
}
