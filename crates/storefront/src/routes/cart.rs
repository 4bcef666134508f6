//! Cart route handlers.
//!
//! Every handler works for guests and authenticated customers alike: the
//! store behind the cart service is picked per request from the session's
//! auth state. Responses carry the cart contents plus derived totals.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use farmferry_core::{Price, ProductId};

use crate::cart::{AnyCartStore, Cart, CartLine, CartService, CartTotals};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::AuthSession;
use crate::state::AppState;

use super::ok;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            unit: line.unit.clone(),
            quantity: line.quantity,
            price: Price::new(line.effective_price()).to_string(),
            line_total: Price::new(line.line_total()).to_string(),
        }
    }
}

/// Cart display data: lines plus derived totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub totals: CartTotals,
    pub grand_total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.lines().iter().map(CartLineView::from).collect(),
            grand_total: totals.grand_total_display(),
            totals,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Build the cart service for this request: backend cart when
/// authenticated, session snapshot otherwise.
pub(crate) fn cart_service(
    state: &AppState,
    session: Session,
    auth: Option<&AuthSession>,
) -> CartService<AnyCartStore> {
    CartService::new(AnyCartStore::select(
        state.backend(),
        session,
        auth.map(|a| a.tokens.access_token.clone()),
    ))
}

/// Get the cart contents and totals.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let cart = cart_service(&state, session, auth.as_ref()).fetch().await?;
    Ok(ok(CartView::from(&cart)))
}

/// Add a product to the cart.
///
/// The product is fetched from the backend first so the stock guard and the
/// guest price snapshot both work from current data.
#[instrument(skip(state, session, auth), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Json(form): Json<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let product = state.backend().get_product(&form.product_id).await?;

    let cart = cart_service(&state, session, auth.as_ref())
        .add(&product, form.quantity.unwrap_or(1))
        .await?;

    Ok(ok(CartView::from(&cart)))
}

/// Bump a line's quantity by one.
#[instrument(skip(state, session, auth), fields(product_id = %product_id))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let cart = cart_service(&state, session, auth.as_ref())
        .increase(&product_id)
        .await?;
    Ok(ok(CartView::from(&cart)))
}

/// Drop a line's quantity by one; a line at one unit is removed.
#[instrument(skip(state, session, auth), fields(product_id = %product_id))]
pub async fn decrease(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let cart = cart_service(&state, session, auth.as_ref())
        .decrease(&product_id)
        .await?;
    Ok(ok(CartView::from(&cart)))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, auth), fields(product_id = %product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let cart = cart_service(&state, session, auth.as_ref())
        .remove(&product_id)
        .await?;
    Ok(ok(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(state, session, auth))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let service = cart_service(&state, session, auth.as_ref());
    service.clear().await?;
    let cart = service.fetch().await?;
    Ok(ok(CartView::from(&cart)))
}
