//! FarmFerry commerce backend client.
//!
//! The storefront owns no commerce logic: catalog, cart, address, order, and
//! auth operations are REST calls against the backend's versioned API
//! (`/api/v1`). This module provides the typed client, the wire types, and
//! the single documented response envelope every endpoint is decoded
//! through.

mod client;
mod envelope;
mod types;

pub use client::BackendClient;
pub use envelope::Envelope;
pub use types::*;

/// Errors from the commerce backend boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The envelope was well-formed but `data` did not match the documented
    /// schema for the endpoint.
    #[error("JSON decode error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response did not match the documented `{success, message, data}`
    /// envelope. Unrecognized shapes are rejected, never guessed around.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The backend reported failure through the envelope (`success: false`).
    #[error("backend reported failure: {0}")]
    Backend(String),

    /// Resource not found (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success HTTP status.
    #[error("backend returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the envelope, or the raw body prefix.
        message: String,
    },
}

impl ApiError {
    /// Whether this error means the resource is gone on the backend.
    ///
    /// Used by the cart service to make its delete fail-open tolerance an
    /// explicit, single-site decision.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
