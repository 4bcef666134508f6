//! Account route handlers: the customer's address book.
//!
//! Thin CRUD over the backend's address endpoints under the customer's
//! token. The backend owns validation and the default-address invariant.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use farmferry_core::AddressId;

use crate::error::Result;
use crate::farmferry::AddressInput;
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::{ok, ok_message};

/// List the customer's saved addresses.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<impl IntoResponse> {
    let addresses = state.backend().get_addresses(auth.access_token()).await?;
    Ok(ok(addresses))
}

/// Create a new address.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(input): Json<AddressInput>,
) -> Result<impl IntoResponse> {
    let address = state
        .backend()
        .create_address(auth.access_token(), &input)
        .await?;
    Ok(ok(address))
}

/// Replace an existing address.
#[instrument(skip_all, fields(address_id = %address_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(address_id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<impl IntoResponse> {
    let address = state
        .backend()
        .update_address(auth.access_token(), &address_id, &input)
        .await?;
    Ok(ok(address))
}

/// Delete an address.
#[instrument(skip_all, fields(address_id = %address_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(address_id): Path<AddressId>,
) -> Result<impl IntoResponse> {
    state
        .backend()
        .delete_address(auth.access_token(), &address_id)
        .await?;
    Ok(ok_message("Address deleted"))
}
