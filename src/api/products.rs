//! Public catalog routes and purchases.

use super::response::{AppPath, Data, data};
use crate::{
    auth::AuthUser,
    core::{catalog, purchase, tracking},
    entities::{order, product},
    errors::Result,
    state::SharedState,
};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

/// Query string of `GET /products/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Name substring
    pub q: Option<String>,
    /// `addedDate` or `price`
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Catalog and purchase routes
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/product/{id}", get(get_product))
        .route("/products/purchase/{id}", post(purchase_product))
}

async fn list_products(State(state): State<SharedState>) -> Result<Data<Vec<product::Model>>> {
    Ok(data(catalog::list_products(&state.store).await?))
}

async fn search_products(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Data<Vec<product::Model>>> {
    let query = catalog::parse_search(
        params.q.as_deref(),
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
    )?;
    Ok(data(catalog::search_products(&state.store, &query).await?))
}

async fn get_product(
    State(state): State<SharedState>,
    AppPath(id): AppPath<i64>,
) -> Result<Data<product::Model>> {
    let product = catalog::get_product(&state.store, id).await?;
    tracking::record_view(&state.store, &product).await?;
    Ok(data(product))
}

async fn purchase_product(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<(StatusCode, Data<order::Model>)> {
    let order = purchase::purchase_product(&state.store, id, user.id).await?;
    Ok((StatusCode::CREATED, data(order)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use crate::store::{EventRepository, OrderRepository, ProductRepository};
    use crate::test_utils::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_products_envelope() -> crate::errors::Result<()> {
        let (app, state) = test_app().await?;
        let store = &state.store;
        create_test_product(store, "Dune", "Books").await?;
        let gone = create_test_product(store, "Gone", "Books").await?;
        store.soft_delete_product(gone.id).await?;

        let (status, _, body) = send(&app, json_request("GET", "/products", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let products = body["data"].as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Dune");
        assert!(products[0].get("is_deleted").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_search_sorting_and_bad_sort() -> crate::errors::Result<()> {
        let (app, state) = test_app().await?;
        let store = &state.store;
        create_custom_product(store, "Rust Book", "Books", 40.0, 1).await?;
        create_custom_product(store, "Rust Mug", "Kitchen", 12.0, 1).await?;
        create_custom_product(store, "Go Book", "Books", 30.0, 1).await?;

        let request = json_request(
            "GET",
            "/products/search?q=Rust&sortBy=price&sortOrder=asc",
            None,
            None,
        );
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Rust Mug", "Rust Book"]);

        let request = json_request("GET", "/products/search?sortBy=rating", None, None);
        let (status, _, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid sort option");

        Ok(())
    }

    #[tokio::test]
    async fn test_product_view_is_tracked() -> crate::errors::Result<()> {
        let (app, state) = test_app().await?;
        let store = &state.store;
        let product = create_test_product(store, "Dune", "Books").await?;

        let uri = format!("/product/{}", product.id);
        let (status, _, body) = send(&app, json_request("GET", &uri, None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], product.id);
        assert_eq!(store.count_events().await?, 1);

        // Unknown products are not tracked
        let (status, _, body) = send(&app, json_request("GET", "/product/999", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
        assert_eq!(store.count_events().await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_requires_login() -> crate::errors::Result<()> {
        let (app, state) = test_app().await?;
        let store = &state.store;
        let product = create_test_product(store, "Dune", "Books").await?;

        let uri = format!("/products/purchase/{}", product.id);
        let (status, _, _) = send(&app, json_request("POST", &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(store.list_orders().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_over_http() -> crate::errors::Result<()> {
        let (app, state) = test_app().await?;
        let store = &state.store;
        let buyer = create_test_user(store, "ada@example.com").await?;
        let product = create_custom_product(store, "P1", "Books", 50.0, 10).await?;
        let auth = bearer(&buyer)?;

        let uri = format!("/products/purchase/{}", product.id);
        let (status, _, body) = send(&app, json_request("POST", &uri, Some(&auth), None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["product_id"], product.id);
        assert_eq!(body["data"]["user_id"], buyer.id);
        assert_eq!(body["data"]["quantity"], 1);
        assert_eq!(body["data"]["total_price"].as_f64().unwrap(), 50.0);

        let reloaded = store.find_product(product.id).await?.unwrap();
        assert_eq!(reloaded.inventory, 9);

        let (status, _, _) = send(
            &app,
            json_request("POST", "/products/purchase/999", Some(&auth), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(store.list_orders().await?.len(), 1);

        Ok(())
    }
}
