//! Cart persistence adapters.
//!
//! The service talks to one [`CartStore`]; which one is picked per request
//! by auth status. Guest carts are session-backed snapshots; authenticated
//! carts live on the commerce backend, which stays authoritative - every
//! mutation returns the server's cart.

use tower_sessions::Session;

use farmferry_core::ProductId;

use crate::farmferry::{BackendClient, CartItemInput};
use crate::models::session_keys;

use super::{Cart, CartError, CartLine};

/// Persistence adapter for the cart service.
pub trait CartStore {
    /// Load the authoritative cart.
    async fn load(&self) -> Result<Cart, CartError>;

    /// Add a line, accumulating quantities with any existing line for the
    /// same product. Returns the authoritative cart.
    async fn add(&self, line: CartLine) -> Result<Cart, CartError>;

    /// Set the quantity of an existing line.
    async fn set_quantity(&self, product_id: &ProductId, quantity: u32)
    -> Result<Cart, CartError>;

    /// Remove a product's line.
    async fn remove(&self, product_id: &ProductId) -> Result<Cart, CartError>;

    /// Remove every line.
    async fn clear(&self) -> Result<(), CartError>;
}

// =============================================================================
// Guest: session-backed snapshot
// =============================================================================

/// Guest cart store: the whole cart is a snapshot in the session, restored
/// verbatim across requests.
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }
}

impl CartStore for SessionCartStore {
    async fn load(&self) -> Result<Cart, CartError> {
        Ok(self
            .session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    async fn add(&self, line: CartLine) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.upsert(line);
        self.save(&cart).await?;
        Ok(cart)
    }

    async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.set_quantity(product_id, quantity)?;
        self.save(&cart).await?;
        Ok(cart)
    }

    async fn remove(&self, product_id: &ProductId) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.remove(product_id);
        self.save(&cart).await?;
        Ok(cart)
    }

    async fn clear(&self) -> Result<(), CartError> {
        let _previous = self.session.remove::<Cart>(session_keys::CART).await?;
        Ok(())
    }
}

// =============================================================================
// Authenticated: backend-owned cart
// =============================================================================

/// Authenticated cart store: a thin adapter over the backend's cart
/// endpoints under the customer's access token.
pub struct RemoteCartStore {
    backend: BackendClient,
    access_token: String,
}

impl RemoteCartStore {
    #[must_use]
    pub const fn new(backend: BackendClient, access_token: String) -> Self {
        Self {
            backend,
            access_token,
        }
    }
}

impl CartStore for RemoteCartStore {
    async fn load(&self) -> Result<Cart, CartError> {
        let payload = self.backend.get_cart(&self.access_token).await?;
        Ok(Cart::from(payload))
    }

    async fn add(&self, line: CartLine) -> Result<Cart, CartError> {
        let payload = self
            .backend
            .add_cart_item(
                &self.access_token,
                &CartItemInput {
                    product_id: line.product_id,
                    quantity: line.quantity,
                },
            )
            .await?;
        Ok(Cart::from(payload))
    }

    async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let payload = self
            .backend
            .update_cart_item(
                &self.access_token,
                &CartItemInput {
                    product_id: product_id.clone(),
                    quantity,
                },
            )
            .await?;
        Ok(Cart::from(payload))
    }

    async fn remove(&self, product_id: &ProductId) -> Result<Cart, CartError> {
        let payload = self
            .backend
            .remove_cart_item(&self.access_token, product_id)
            .await?;
        Ok(Cart::from(payload))
    }

    async fn clear(&self) -> Result<(), CartError> {
        self.backend.clear_cart(&self.access_token).await?;
        Ok(())
    }
}

// =============================================================================
// Runtime selection
// =============================================================================

/// Store selected per request by auth status.
pub enum AnyCartStore {
    /// Guest session snapshot.
    Session(SessionCartStore),
    /// Backend-owned cart under the customer's token.
    Remote(RemoteCartStore),
}

impl AnyCartStore {
    /// Pick the store for this request: the backend cart when an access
    /// token is present, the session snapshot otherwise.
    #[must_use]
    pub fn select(backend: &BackendClient, session: Session, token: Option<String>) -> Self {
        match token {
            Some(token) => Self::Remote(RemoteCartStore::new(backend.clone(), token)),
            None => Self::Session(SessionCartStore::new(session)),
        }
    }
}

impl CartStore for AnyCartStore {
    async fn load(&self) -> Result<Cart, CartError> {
        match self {
            Self::Session(store) => store.load().await,
            Self::Remote(store) => store.load().await,
        }
    }

    async fn add(&self, line: CartLine) -> Result<Cart, CartError> {
        match self {
            Self::Session(store) => store.add(line).await,
            Self::Remote(store) => store.add(line).await,
        }
    }

    async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        match self {
            Self::Session(store) => store.set_quantity(product_id, quantity).await,
            Self::Remote(store) => store.set_quantity(product_id, quantity).await,
        }
    }

    async fn remove(&self, product_id: &ProductId) -> Result<Cart, CartError> {
        match self {
            Self::Session(store) => store.remove(product_id).await,
            Self::Remote(store) => store.remove(product_id).await,
        }
    }

    async fn clear(&self) -> Result<(), CartError> {
        match self {
            Self::Session(store) => store.clear().await,
            Self::Remote(store) => store.clear().await,
        }
    }
}
