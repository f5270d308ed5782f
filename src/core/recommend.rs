//! Related-product recommendations from the behavior log.
//!
//! Ranking is pure view frequency: every recorded view of a product in the same
//! category counts once, over the whole history. Equal counts are ordered by the
//! lower product id so results are stable across calls.

use crate::{
    entities::{behavior_event, product},
    errors::{Error, Result},
    store::{EventRepository, ProductRepository},
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Maximum number of products returned by [`related_products`]
pub const MAX_RECOMMENDATIONS: usize = 5;

/// A product id and how many views it has in the category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedProduct {
    /// Viewed product
    pub product_id: i64,
    /// Number of recorded views
    pub views: u64,
}

/// Ranks the products viewed in `category`, most viewed first.
///
/// Events from other categories and events for `exclude_id` are ignored. The
/// result holds at most `limit` entries, ordered by view count descending and
/// then by product id ascending.
#[must_use]
pub fn rank_related(
    events: &[behavior_event::Model],
    category: &str,
    exclude_id: i64,
    limit: usize,
) -> Vec<RankedProduct> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for event in events
        .iter()
        .filter(|e| e.category == category && e.product_id != exclude_id)
    {
        *counts.entry(event.product_id).or_default() += 1;
    }

    let mut ranked: Vec<RankedProduct> = counts
        .into_iter()
        .map(|(product_id, views)| RankedProduct { product_id, views })
        .collect();
    // Stable sort over id-ordered input keeps lower ids first on ties
    ranked.sort_by(|a, b| b.views.cmp(&a.views));
    ranked.truncate(limit);
    ranked
}

/// Returns up to [`MAX_RECOMMENDATIONS`] products related to `product`.
///
/// Products are ranked with [`rank_related`] and returned in rank order. Ranked ids
/// that no longer resolve to an active product are skipped.
///
/// # Errors
/// Returns [`Error::NoRelatedProducts`] when nothing else in the category has been
/// viewed, or a store error if a query fails.
#[instrument(skip(store, product), fields(product_id = product.id))]
pub async fn related_products<S>(store: &S, product: &product::Model) -> Result<Vec<product::Model>>
where
    S: EventRepository + ProductRepository,
{
    let events = store.events_in_category(&product.category).await?;
    let ranked = rank_related(&events, &product.category, product.id, MAX_RECOMMENDATIONS);
    debug!(
        "Ranked {} related products from {} events",
        ranked.len(),
        events.len()
    );

    let ids: Vec<i64> = ranked.iter().map(|r| r.product_id).collect();
    let mut by_id: HashMap<i64, product::Model> = store
        .find_products(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let related: Vec<product::Model> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
    if related.is_empty() {
        return Err(Error::NoRelatedProducts {
            product_id: product.id,
        });
    }
    Ok(related)
}
