//! Purchase business logic - Buys one unit of a product and records the order.
//!
//! The inventory decrement and the order insert run inside a single unit of work:
//! either both become visible or neither does. The decrement is a relative
//! `inventory = inventory - 1` update, so concurrent purchases of the same product
//! cannot overwrite each other's decrement.
//!
//! Inventory has no lower bound here. A purchase that takes stock below zero still
//! succeeds and is logged as a warning, leaving backorder policy to the caller.

use crate::{
    entities::order,
    errors::{Error, Result},
    store::{NewOrder, OrderRepository, Store, UnitOfWork},
};
use tracing::{error, info, instrument, warn};

/// Units bought by a single purchase
pub const PURCHASE_QUANTITY: i32 = 1;

/// Purchases one unit of `product_id` for `user_id`.
///
/// # Steps
/// 1. Look up the active product inside a new unit of work
/// 2. Decrement its inventory by one
/// 3. Insert an order for one unit at the product's current price
/// 4. Commit
///
/// Any failure after the unit of work is opened rolls it back, so a failed order
/// insert never leaves the inventory decremented.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist or is deleted ([`Error::ProductNotFound`])
/// - Any store operation fails
#[instrument(skip(store))]
pub async fn purchase_product<S: Store>(
    store: &S,
    product_id: i64,
    user_id: i64,
) -> Result<order::Model> {
    let work = store.begin().await?;

    match place_order(&work, product_id, user_id).await {
        Ok(order) => {
            work.commit().await?;
            info!(
                "User {} purchased product {} (order {}, total {:.2})",
                user_id, product_id, order.id, order.total_price
            );
            Ok(order)
        }
        Err(e) => {
            if let Err(rollback_err) = work.rollback().await {
                error!(
                    "Rollback after failed purchase of product {} failed: {}",
                    product_id, rollback_err
                );
            }
            Err(e)
        }
    }
}

async fn place_order<W: UnitOfWork>(
    work: &W,
    product_id: i64,
    user_id: i64,
) -> Result<order::Model> {
    let product = work
        .find_product(product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let updated = work
        .adjust_inventory(product.id, -PURCHASE_QUANTITY)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    if updated.inventory < 0 {
        warn!(
            "Product {} oversold: inventory is now {}",
            product.id, updated.inventory
        );
    }

    work.insert_order(NewOrder {
        product_id: product.id,
        quantity: PURCHASE_QUANTITY,
        total_price: product.price * f64::from(PURCHASE_QUANTITY),
        user_id,
    })
    .await
}

/// Retrieves every order, oldest first.
pub async fn list_orders<S: OrderRepository>(store: &S) -> Result<Vec<order::Model>> {
    store.list_orders().await
}
