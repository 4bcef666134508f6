//! Authentication extractors.
//!
//! The storefront API is JSON-only, so an unauthenticated request to a
//! protected handler gets a 401 envelope rather than a redirect.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{AuthSession, session_keys};

/// Extractor that requires an authenticated customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("token: {}", auth.access_token())
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Rejection for unauthenticated requests to protected handlers.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "message": "Authentication required",
            })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The session is put in extensions by SessionManagerLayer
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let auth: AuthSession = session
            .get(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(auth))
    }
}

/// Extractor that optionally reads the authenticated customer.
///
/// Never rejects; handlers that serve guests and customers alike (the cart)
/// use this to pick their store.
pub struct OptionalAuth(pub Option<AuthSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<AuthSession>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(auth))
    }
}

/// Store the authenticated customer in the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_current_customer(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_CUSTOMER, auth).await
}

/// Remove the authenticated customer from the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    let _previous = session
        .remove::<AuthSession>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
