//! Catalog route handlers: categories.

use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

use super::ok;

/// Category listing (served from the client's 5-minute cache).
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.backend().get_categories().await?;
    Ok(ok(categories))
}
