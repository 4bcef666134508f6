//! The cart service.
//!
//! One source of truth for "what's in the cart" across guest and
//! authenticated sessions. The service owns the canonical line collection -
//! keyed by product id, line ids are carried only for backend calls - and
//! persists through an injected [`CartStore`] adapter selected by auth
//! status: guest carts live in the session, authenticated carts live on the
//! commerce backend (which stays authoritative: every mutation replaces
//! local state with the server's cart).

mod store;
mod totals;

pub use store::{AnyCartStore, CartStore, RemoteCartStore, SessionCartStore};
pub use totals::{CartTotals, DELIVERY_CHARGE, FREE_DELIVERY_THRESHOLD, PLATFORM_FEE};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use farmferry_core::{CartLineId, ProductId};

use crate::farmferry::{ApiError, CartLinePayload, CartPayload, Product};

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The product reports zero stock; the cart was not touched.
    #[error("{name} is out of stock")]
    OutOfStock {
        /// Product display name, for the error message shown to the customer.
        name: String,
    },

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The session store failed to load or persist the guest cart.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The commerce backend rejected or failed a cart call.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One cart line: a product snapshot plus a quantity.
///
/// Invariant: `quantity >= 1` - a line that would reach zero is removed
/// instead. Lines are unique per product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    /// Backend-issued for server carts, synthesized (`local-...`) for guest
    /// carts. Never used for lookup - product id is the key.
    pub line_id: CartLineId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub gst_percent: Decimal,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
}

impl CartLine {
    /// Build a guest line from a product snapshot, with a synthesized line
    /// id.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            line_id: CartLineId::new(format!("local-{}", Uuid::new_v4())),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            unit: product.unit.clone(),
            quantity,
            price: product.price,
            discounted_price: product.discounted_price,
            gst_percent: product.gst_percent.unwrap_or_default(),
            stock_quantity: product.stock_quantity,
        }
    }

    /// The unit price the customer pays.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    /// Line total: effective price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price() * Decimal::from(self.quantity)
    }

    /// A copy of this line carrying a different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self { quantity, ..self.clone() }
    }
}

impl From<CartLinePayload> for CartLine {
    fn from(line: CartLinePayload) -> Self {
        Self {
            product_id: line.product.id.clone(),
            line_id: line.id,
            name: line.product.name.clone(),
            image_url: line.product.image_url.clone(),
            unit: line.product.unit.clone(),
            quantity: line.quantity,
            price: line.product.price,
            discounted_price: line.product.discounted_price,
            gst_percent: line.product.gst_percent.unwrap_or_default(),
            stock_quantity: line.product.stock_quantity,
        }
    }
}

/// The cart contents: an ordered collection of lines, unique per product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Build a cart from lines. Later duplicates of a product id fold into
    /// the earlier line.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::default();
        for line in lines {
            cart.upsert(line);
        }
        cart
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up a line by product id - the only key the cart recognizes.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Insert a line, accumulating quantities into any existing line for the
    /// same product. The existing line id is kept.
    pub fn upsert(&mut self, line: CartLine) {
        match self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            Some(existing) => existing.quantity += line.quantity,
            None => self.lines.push(line),
        }
    }

    /// Set the quantity of an existing line. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line matches.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line if present. Removing an absent line is a no-op.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    /// Take the lines out of the cart.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Derive the totals for the current contents.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.lines)
    }
}

impl From<CartPayload> for Cart {
    fn from(payload: CartPayload) -> Self {
        Self::new(payload.items.into_iter().map(CartLine::from).collect())
    }
}

/// The cart service: operations over the canonical cart, persisted through
/// an injected store.
pub struct CartService<S> {
    store: S,
}

impl<S: CartStore> CartService<S> {
    /// Create a service over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the authoritative cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn fetch(&self) -> Result<Cart, CartError> {
        self.store.load().await
    }

    /// Add units of a product to the cart.
    ///
    /// Refuses products reported out of stock without touching the cart.
    /// A zero quantity is treated as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] for unavailable products, or any
    /// store error.
    pub async fn add(&self, product: &Product, quantity: u32) -> Result<Cart, CartError> {
        if product.is_out_of_stock() {
            return Err(CartError::OutOfStock {
                name: product.name.clone(),
            });
        }

        let quantity = quantity.max(1);
        self.store
            .add(CartLine::from_product(product, quantity))
            .await
    }

    /// Increase a line's quantity by one.
    ///
    /// Deliberately re-adds through the store's accumulate path instead of
    /// updating by line id, so a stale line id can never strand the
    /// operation - the add path self-heals against id drift.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub async fn increase(&self, product_id: &ProductId) -> Result<Cart, CartError> {
        let cart = self.store.load().await?;
        let line = cart
            .get(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;

        self.store.add(line.with_quantity(1)).await
    }

    /// Decrease a line's quantity by one; a line at one unit is removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub async fn decrease(&self, product_id: &ProductId) -> Result<Cart, CartError> {
        let cart = self.store.load().await?;
        let line = cart
            .get(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;

        if line.quantity <= 1 {
            self.remove(product_id).await
        } else {
            self.store
                .set_quantity(product_id, line.quantity - 1)
                .await
        }
    }

    /// Remove a product's line from the cart.
    ///
    /// A backend that already dropped the line (404) is tolerated: the
    /// outcome the customer asked for - line gone - holds either way. This
    /// is the one place that fail-open decision lives.
    ///
    /// # Errors
    ///
    /// Returns any other store error.
    pub async fn remove(&self, product_id: &ProductId) -> Result<Cart, CartError> {
        match self.store.remove(product_id).await {
            Ok(cart) => Ok(cart),
            Err(CartError::Api(err)) if err.is_not_found() => {
                tracing::warn!(
                    product_id = %product_id,
                    error = %err,
                    "backend had already dropped the cart line; treating as removed"
                );
                self.store.load().await
            }
            Err(err) => Err(err),
        }
    }

    /// Merge previously-guest lines into this cart, line by line.
    ///
    /// Quantities accumulate with any lines already present. A line the
    /// store rejects (e.g. the product disappeared) is logged and skipped so
    /// one dead product cannot sink the rest of the merge.
    ///
    /// # Errors
    ///
    /// Returns an error only if the final reload fails.
    pub async fn merge_from(&self, lines: Vec<CartLine>) -> Result<Cart, CartError> {
        for line in lines {
            if let Err(err) = self.store.add(line.clone()).await {
                tracing::warn!(
                    product_id = %line.product_id,
                    error = %err,
                    "skipping cart line that could not be merged"
                );
            }
        }
        self.store.load().await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn clear(&self) -> Result<(), CartError> {
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// In-memory store double; optionally fails `remove` like a backend that
    /// already dropped the line.
    #[derive(Default)]
    struct FakeStore {
        cart: Mutex<Cart>,
        remove_returns_not_found: bool,
    }

    impl CartStore for FakeStore {
        async fn load(&self) -> Result<Cart, CartError> {
            Ok(self.cart.lock().expect("lock").clone())
        }

        async fn add(&self, line: CartLine) -> Result<Cart, CartError> {
            let mut cart = self.cart.lock().expect("lock");
            cart.upsert(line);
            Ok(cart.clone())
        }

        async fn set_quantity(
            &self,
            product_id: &ProductId,
            quantity: u32,
        ) -> Result<Cart, CartError> {
            let mut cart = self.cart.lock().expect("lock");
            cart.set_quantity(product_id, quantity)?;
            Ok(cart.clone())
        }

        async fn remove(&self, product_id: &ProductId) -> Result<Cart, CartError> {
            if self.remove_returns_not_found {
                return Err(CartError::Api(ApiError::NotFound(
                    "cart line not found".to_owned(),
                )));
            }
            let mut cart = self.cart.lock().expect("lock");
            cart.remove(product_id);
            Ok(cart.clone())
        }

        async fn clear(&self) -> Result<(), CartError> {
            *self.cart.lock().expect("lock") = Cart::default();
            Ok(())
        }
    }

    fn product(id: &str, price: i64, stock: Option<u32>) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("product {id}"),
            "price": price,
            "stockQuantity": stock,
        }))
        .expect("product")
    }

    #[tokio::test]
    async fn test_add_and_fetch() {
        let service = CartService::new(FakeStore::default());
        let cart = service.add(&product("p1", 100, Some(5)), 2).await.expect("add");
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.get(&ProductId::new("p1")).expect("line").quantity, 2);
    }

    #[tokio::test]
    async fn test_add_out_of_stock_never_mutates() {
        let service = CartService::new(FakeStore::default());
        let err = service
            .add(&product("p1", 100, Some(0)), 1)
            .await
            .expect_err("out of stock");
        assert!(matches!(err, CartError::OutOfStock { .. }));
        assert!(service.fetch().await.expect("fetch").is_empty());
    }

    #[tokio::test]
    async fn test_add_accumulates_quantities() {
        let service = CartService::new(FakeStore::default());
        let item = product("p1", 100, None);
        service.add(&item, 1).await.expect("add");
        let cart = service.add(&item, 2).await.expect("add again");
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.get(&item.id).expect("line").quantity, 3);
    }

    #[tokio::test]
    async fn test_increase_then_decrease_round_trips() {
        let service = CartService::new(FakeStore::default());
        let item = product("p1", 100, None);
        service.add(&item, 2).await.expect("add");

        service.increase(&item.id).await.expect("increase");
        let cart = service.decrease(&item.id).await.expect("decrease");
        assert_eq!(cart.get(&item.id).expect("line").quantity, 2);
    }

    #[tokio::test]
    async fn test_decrease_at_one_removes_line() {
        let service = CartService::new(FakeStore::default());
        let item = product("p1", 100, None);
        service.add(&item, 1).await.expect("add");

        let cart = service.decrease(&item.id).await.expect("decrease");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_increase_unknown_product() {
        let service = CartService::new(FakeStore::default());
        let err = service
            .increase(&ProductId::new("ghost"))
            .await
            .expect_err("not in cart");
        assert!(matches!(err, CartError::NotInCart(_)));
    }

    #[tokio::test]
    async fn test_remove_tolerates_backend_not_found() {
        let store = FakeStore {
            remove_returns_not_found: true,
            ..FakeStore::default()
        };
        let service = CartService::new(store);
        let cart = service
            .remove(&ProductId::new("p1"))
            .await
            .expect("remove is fail-open on 404");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_merge_accumulates_with_existing_lines() {
        let service = CartService::new(FakeStore::default());
        let item = product("p1", 100, None);
        service.add(&item, 1).await.expect("add");

        let guest_lines = vec![
            CartLine::from_product(&item, 2),
            CartLine::from_product(&product("p2", 50, None), 1),
        ];
        let cart = service.merge_from(guest_lines).await.expect("merge");
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.get(&item.id).expect("line").quantity, 3);
    }

    #[test]
    fn test_cart_new_folds_duplicate_product_ids() {
        let item = product("p1", 100, None);
        let cart = Cart::new(vec![
            CartLine::from_product(&item, 1),
            CartLine::from_product(&item, 2),
        ]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.get(&item.id).expect("line").quantity, 3);
    }
}
