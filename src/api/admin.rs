//! Admin-only routes: catalog management, orders, and reports.
//!
//! Every handler takes an [`AdminUser`], so non-admin callers get 403 and
//! anonymous callers 401 before any handler body runs.

use super::response::{AppJson, AppPath, Data, data};
use crate::{
    auth::AdminUser,
    core::{
        account, catalog, purchase, recommend,
        tracking::{self, ViewCounts},
    },
    entities::{order, product, user},
    errors::Result,
    state::SharedState,
    store::{NewProduct, ProductChanges},
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};

/// Body of `POST /admin/product`
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Catalog category
    pub category: String,
    /// Display name
    #[serde(alias = "productname")]
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Opaque attribute string
    #[serde(default)]
    pub attributes: String,
    /// Initial stock
    #[serde(default)]
    pub inventory: i32,
}

/// Body of `PATCH /admin/product/{id}`; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProductRequest {
    /// New category
    pub category: Option<String>,
    /// New display name
    #[serde(alias = "productname")]
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

/// Response of the related-products report
#[derive(Debug, Serialize)]
pub struct RelatedProducts {
    /// Product the report was requested for
    pub product: product::Model,
    /// Ranked recommendations
    pub recommended_items: Vec<product::Model>,
}

/// Admin routes
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/admin/product", post(create_product))
        .route(
            "/admin/product/{id}",
            patch(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders))
        .route("/users/admin/users", get(list_users))
        .route("/users/admin/webtracking/count", get(view_counts))
        .route("/users/admin/related_product/{id}", get(related_products))
}

async fn create_product(
    State(state): State<SharedState>,
    _admin: AdminUser,
    AppJson(body): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Data<product::Model>)> {
    let product = catalog::create_product(
        &state.store,
        NewProduct {
            category: body.category,
            name: body.name,
            description: body.description,
            price: body.price,
            attributes: body.attributes,
            inventory: body.inventory,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, data(product)))
}

async fn update_product(
    State(state): State<SharedState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateProductRequest>,
) -> Result<Data<product::Model>> {
    let product = catalog::update_product(
        &state.store,
        id,
        ProductChanges {
            category: body.category,
            name: body.name,
            description: body.description,
            price: body.price,
            attributes: body.attributes,
            inventory: body.inventory,
        },
    )
    .await?;
    Ok(data(product))
}

async fn delete_product(
    State(state): State<SharedState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
) -> Result<Data<product::Model>> {
    Ok(data(catalog::delete_product(&state.store, id).await?))
}

async fn list_orders(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<Data<Vec<order::Model>>> {
    Ok(data(purchase::list_orders(&state.store).await?))
}

async fn list_users(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<Data<Vec<user::Model>>> {
    Ok(data(account::list_users(&state.store).await?))
}

async fn view_counts(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<Data<ViewCounts>> {
    Ok(data(tracking::view_counts(&state.store).await?))
}

async fn related_products(
    State(state): State<SharedState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
) -> Result<Data<RelatedProducts>> {
    let product = catalog::get_product(&state.store, id).await?;
    let recommended_items = recommend::related_products(&state.store, &product).await?;
    Ok(data(RelatedProducts {
        product,
        recommended_items,
    }))
}
