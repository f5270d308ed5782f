//! Behavior log - Records product views and reports view counts.

use crate::{
    entities::{behavior_event, product},
    errors::Result,
    store::{EventRepository, NewEvent},
};
use serde::Serialize;
use tracing::debug;

/// View totals for the admin report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    /// Number of events recorded for all products
    pub total_count: u64,
    /// Per-product counts, ordered by product id
    pub product_counts: Vec<ProductViews>,
}

/// Number of views recorded for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductViews {
    /// Viewed product
    pub product_id: i64,
    /// Recorded views
    pub count: i64,
}

/// Appends a view event for `product`.
///
/// The event copies the product's category, name, and attributes as they are at
/// view time, so later edits to the product do not rewrite history.
pub async fn record_view<S: EventRepository>(
    store: &S,
    product: &product::Model,
) -> Result<behavior_event::Model> {
    let event = store
        .insert_event(NewEvent {
            product_id: product.id,
            category: product.category.clone(),
            product_name: product.name.clone(),
            attributes: product.attributes.clone(),
        })
        .await?;
    debug!("Recorded view of product {} (event {})", product.id, event.id);
    Ok(event)
}

/// Counts recorded views, in total and per product.
pub async fn view_counts<S: EventRepository>(store: &S) -> Result<ViewCounts> {
    let total_count = store.count_events().await?;
    let product_counts = store
        .count_events_by_product()
        .await?
        .into_iter()
        .map(|(product_id, count)| ProductViews { product_id, count })
        .collect();

    Ok(ViewCounts {
        total_count,
        product_counts,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::store::ProductChanges;
    use crate::store::ProductRepository;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_record_view_snapshots_product() -> Result<()> {
        let store = setup_test_store().await?;
        let product = create_test_product(&store, "Dune", "Books").await?;

        let event = record_view(&store, &product).await?;
        assert_eq!(event.product_id, product.id);
        assert_eq!(event.category, "Books");
        assert_eq!(event.product_name, "Dune");

        // Renaming the product leaves the recorded event untouched
        store
            .update_product(
                product.id,
                ProductChanges {
                    name: Some("Dune Messiah".to_string()),
                    ..ProductChanges::default()
                },
            )
            .await?;
        let events = store.events_in_category("Books").await?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].product_name, "Dune");

        Ok(())
    }

    #[tokio::test]
    async fn test_view_counts() -> Result<()> {
        let store = setup_test_store().await?;
        let book = create_test_product(&store, "Book", "Books").await?;
        let game = create_test_product(&store, "Game", "Games").await?;
        create_test_product(&store, "Unseen", "Games").await?;

        record_views(&store, &book, 3).await?;
        record_views(&store, &game, 1).await?;

        let counts = view_counts(&store).await?;
        assert_eq!(counts.total_count, 4);
        assert_eq!(
            counts.product_counts,
            vec![
                ProductViews {
                    product_id: book.id,
                    count: 3
                },
                ProductViews {
                    product_id: game.id,
                    count: 1
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_view_counts_empty() -> Result<()> {
        let store = setup_test_store().await?;

        let counts = view_counts(&store).await?;
        assert_eq!(counts.total_count, 0);
        assert!(counts.product_counts.is_empty());

        Ok(())
    }
}
