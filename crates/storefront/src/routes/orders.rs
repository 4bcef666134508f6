//! Order route handlers.
//!
//! Checkout assembles the order body from the live backend cart, the chosen
//! address, and the payment method, then makes exactly one POST. The
//! backend owns the order from that point; history and status are
//! pass-through reads.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use farmferry_core::{AddressId, OrderId, PaymentMethod};

use crate::cart::{CartService, RemoteCartStore};
use crate::error::{AppError, Result};
use crate::farmferry::{OrderInput, OrderItemInput};
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::ok;

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub address_id: AddressId,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Place an order from the live cart.
#[instrument(skip(state, auth, form), fields(address_id = %form.address_id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(form): Json<CheckoutForm>,
) -> Result<impl IntoResponse> {
    let service = CartService::new(RemoteCartStore::new(
        state.backend().clone(),
        auth.tokens.access_token.clone(),
    ));

    let cart = service.fetch().await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    }

    let totals = cart.totals();
    let input = OrderInput {
        items: cart
            .lines()
            .iter()
            .map(|line| OrderItemInput {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.effective_price(),
            })
            .collect(),
        address_id: form.address_id,
        payment_method: form.payment_method,
        subtotal: totals.subtotal,
        delivery_charge: totals.delivery_charge,
        platform_fee: totals.platform_fee,
        gst: totals.gst,
        total_amount: totals.grand_total,
    };

    let order = state
        .backend()
        .create_order(auth.access_token(), &input)
        .await?;

    tracing::info!(order_id = %order.id, "order placed");
    Ok(ok(order))
}

/// The customer's order history.
#[instrument(skip_all)]
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = state.backend().my_orders(auth.access_token()).await?;
    Ok(ok(orders))
}

/// The current status of one order.
#[instrument(skip_all, fields(order_id = %order_id))]
pub async fn status(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let status = state
        .backend()
        .order_status(auth.access_token(), &order_id)
        .await?;
    Ok(ok(json!({ "status": status })))
}
