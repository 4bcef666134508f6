//! Client bootstrap configuration.
//!
//! The browser needs a handful of publishable values (the Maps key for the
//! address picker). Secrets never pass through here.

use axum::{extract::State, response::IntoResponse};
use serde_json::json;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

use super::ok;

/// Publishable client configuration.
#[instrument(skip(state))]
pub async fn client_config(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let config = state.config();
    Ok(ok(json!({
        "baseUrl": config.base_url,
        "googleMapsApiKey": config.google_maps_api_key,
    })))
}
