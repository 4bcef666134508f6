//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses use the same `{success, message}` envelope as the rest of the
//! JSON API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::cart::CartError;
use crate::farmferry::ApiError;
use crate::services::EmailError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce backend call failed.
    #[error("Backend API error: {0}")]
    Api(#[from] ApiError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Outbound email failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status mapping for backend API errors: the backend being wrong or
/// unreachable is a gateway problem; the backend rejecting the request is
/// the client's, and keeps its status.
fn api_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        ApiError::Backend(_) => StatusCode::BAD_REQUEST,
        ApiError::Status { status, .. } if *status < 500 => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        ApiError::Http(_) | ApiError::Parse(_) | ApiError::UnexpectedShape(_)
        | ApiError::Status { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => api_status(err),
            Self::Cart(err) => match err {
                CartError::OutOfStock { .. } => StatusCode::CONFLICT,
                CartError::NotInCart(_) => StatusCode::NOT_FOUND,
                CartError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CartError::Api(err) => api_status(err),
            },
            Self::Email(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to clients. Internal detail stays in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::Api(err) => api_message(err),
            Self::Cart(err) => match err {
                CartError::OutOfStock { .. } | CartError::NotInCart(_) => err.to_string(),
                CartError::Session(_) => "Internal server error".to_string(),
                CartError::Api(err) => api_message(err),
            },
            Self::Email(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::NotFound(msg) => format!("Not found: {msg}"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

fn api_message(err: &ApiError) -> String {
    match err {
        ApiError::Backend(msg) => msg.clone(),
        ApiError::NotFound(msg) => format!("Not found: {msg}"),
        ApiError::RateLimited(_) => "Too many requests, please retry shortly".to_string(),
        // The message of a backend 4xx came out of its envelope and is meant
        // for the customer (e.g. "Invalid credentials")
        ApiError::Status { status, message } if *status < 500 => message.clone(),
        ApiError::Http(_) | ApiError::Parse(_) | ApiError::UnexpectedShape(_)
        | ApiError::Status { .. } => "External service error".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failure classes to Sentry
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let message = self.client_message();

        (
            status,
            Json(json!({
                "success": false,
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_transport_errors_map_to_bad_gateway() {
        let err = AppError::Api(ApiError::UnexpectedShape("not an envelope".to_string()));
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);

        let err = AppError::Api(ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_backend_client_rejection_keeps_its_status() {
        let err = AppError::Api(ApiError::Status {
            status: 401,
            message: "Invalid credentials".to_string(),
        });
        assert_eq!(err.client_message(), "Invalid credentials");
        assert_eq!(get_status(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_backend_rejection_maps_to_bad_request() {
        let err = AppError::Api(ApiError::Backend("invalid OTP".to_string()));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_cart_error_status_codes() {
        let err = AppError::Cart(CartError::OutOfStock {
            name: "Okra".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::CONFLICT);

        let err = AppError::Cart(CartError::NotInCart(farmferry_core::ProductId::new("p1")));
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_rate_limit_passthrough() {
        let err = AppError::Api(ApiError::RateLimited(3));
        assert_eq!(get_status(err), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_internal_detail_is_redacted() {
        let err = AppError::Internal("pool exhausted at worker 7".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AppError::Api(ApiError::UnexpectedShape("keys: a, b".to_string()));
        assert_eq!(err.client_message(), "External service error");
    }

    #[test]
    fn test_out_of_stock_message_is_surfaced() {
        let err = AppError::Cart(CartError::OutOfStock {
            name: "Okra".to_string(),
        });
        assert_eq!(err.client_message(), "Okra is out of stock");
    }
}
