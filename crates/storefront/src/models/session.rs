//! Session-stored types.
//!
//! The session is the storefront's only local persistence - it carries the
//! authenticated customer (with the backend token pair) and the guest cart
//! snapshot.

use serde::{Deserialize, Serialize};

use crate::farmferry::{AuthTokens, Customer};

/// Authenticated session state.
///
/// Created on login or OTP verification, replaced on token refresh,
/// destroyed on logout or refresh failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The customer profile as returned at login.
    pub customer: Customer,
    /// Backend-issued token pair used for customer-scoped API calls.
    pub tokens: AuthTokens,
}

impl AuthSession {
    /// The bearer token for customer-scoped backend calls.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.tokens.access_token
    }
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in customer and token pair.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the guest cart snapshot.
    pub const CART: &str = "cart";
}
