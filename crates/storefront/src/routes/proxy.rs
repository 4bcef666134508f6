//! Transparent backend proxy fallback.
//!
//! Any `/api` request without a first-party handler is forwarded verbatim
//! (method, path, query, JSON body, Authorization header) to the backend's
//! versioned API and the response relayed. Hop-by-hop headers are dropped;
//! only the headers the backend contract actually uses cross the boundary.

use axum::{
    Json,
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::instrument;

use crate::state::AppState;

/// Forward an unmatched `/api` request to the backend.
#[instrument(skip(state, headers, body), fields(method = %method, path = %uri.path()))]
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path());

    let mut url = state.backend().endpoint(path);
    if let Some(query) = uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let Ok(method) = reqwest::Method::from_bytes(method.as_str().as_bytes()) else {
        return bad_gateway("Unsupported method");
    };

    let mut request = state.backend().http().request(method, url);

    for name in [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT] {
        if let Some(value) = headers.get(&name).and_then(|v| v.to_str().ok()) {
            request = request.header(name.as_str(), value);
        }
    }

    if !body.is_empty() {
        request = request.body(body.to_vec());
    }

    let upstream = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "proxy request to backend failed");
            return bad_gateway("Upstream unavailable");
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read proxied response body");
            return bad_gateway("Upstream unavailable");
        }
    };

    let mut response = (status, bytes.to_vec()).into_response();
    if let Some(content_type) = content_type
        && let Ok(value) = HeaderValue::from_str(&content_type)
    {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

fn bad_gateway(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}
