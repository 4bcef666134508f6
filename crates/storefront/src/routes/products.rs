//! Catalog route handlers: products.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use farmferry_core::ProductId;

use crate::error::Result;
use crate::farmferry::ProductQuery;
use crate::state::AppState;

use super::ok;

/// Product listing with optional category/search/pagination filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse> {
    let page = state.backend().get_products(&query).await?;
    Ok(ok(page))
}

/// Product detail.
#[instrument(skip(state), fields(product_id = %product_id))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.backend().get_product(&product_id).await?;
    Ok(ok(product))
}

/// Supplier product feed (the home-page listing source).
#[instrument(skip(state))]
pub async fn supplier_feed(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = state.backend().get_supplier_products().await?;
    Ok(ok(page))
}
