//! FarmFerry backend REST client implementation.
//!
//! Uses `reqwest` over the backend's versioned REST API with `moka` caching
//! for read-mostly catalog data (5-minute TTL). Cart, address, order, and
//! auth calls are never cached - they carry the customer's bearer token and
//! mutate state the backend owns.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use farmferry_core::{AddressId, OrderId, OrderStatus, ProductId};

use crate::config::BackendConfig;

use super::ApiError;
use super::envelope::{decode_ack, decode_data, error_message};
use super::types::{
    Address, AddressInput, CartItemInput, CartPayload, Category, ForgotPasswordInput, LoginInput,
    LoginPayload, Order, OrderInput, OrderStatusPayload, Product, ProductPage, ProductQuery,
    RegisterInput, ResetPasswordInput, SendOtpInput, VerifyOtpInput,
};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Values cached by the client (read-mostly catalog data).
#[derive(Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    Product(Box<Product>),
    Products(ProductPage),
}

/// Client for the FarmFerry commerce backend.
///
/// Cheaply cloneable; all clones share one HTTP connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        let base_url = format!(
            "{}/api/{}",
            config.api_url.trim_end_matches('/'),
            config.api_version
        );

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        }
    }

    /// Absolute URL for an API path.
    ///
    /// Also used by the proxy fallback to forward unmatched `/api` requests.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// The underlying HTTP client, shared with the proxy fallback.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, self.endpoint(path))
            .header("Accept", "application/json");

        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Execute a request and decode the envelope's `data` payload.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.exchange(builder).await?;
        decode_data(&body).inspect_err(|e| {
            if matches!(e, ApiError::UnexpectedShape(_)) {
                tracing::warn!(error = %e, "backend response did not match the documented envelope");
            }
        })
    }

    /// Execute a request that acknowledges without a payload.
    async fn send_ack(&self, builder: RequestBuilder) -> Result<Option<String>, ApiError> {
        let body = self.exchange(builder).await?;
        decode_ack(&body).inspect_err(|e| {
            if matches!(e, ApiError::UnexpectedShape(_)) {
                tracing::warn!(error = %e, "backend response did not match the documented envelope");
            }
        })
    }

    /// Send the request and return the body of a successful response,
    /// mapping non-2xx statuses to typed errors.
    async fn exchange(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(error_message(&body)));
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// Get a page of products.
    ///
    /// The unfiltered first page is cached; filtered or paginated queries go
    /// straight to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = "products:default";

        if query.is_default()
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(cache_key).await
        {
            debug!("cache hit for products");
            return Ok(page);
        }

        let page: ProductPage = self
            .send(self.request(Method::GET, "/products", None).query(query))
            .await?;

        if query.is_default() {
            self.inner
                .cache
                .insert(cache_key.to_owned(), CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .send(self.request(Method::GET, &format!("/products/{product_id}"), None))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the supplier product feed (the home-page listing source).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_supplier_products(&self) -> Result<ProductPage, ApiError> {
        self.send(self.request(Method::GET, "/supplier/products", None))
            .await
    }

    /// Get all categories (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories";

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(cache_key).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .send(self.request(Method::GET, "/categories", None))
            .await?;

        self.inner
            .cache
            .insert(cache_key.to_owned(), CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Check backend reachability (used by the readiness probe).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not reachable or unhealthy.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self
            .request(Method::GET, "/categories", None)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: response.status().as_u16(),
                message: "readiness probe failed".to_owned(),
            })
        }
    }

    // =========================================================================
    // Cart (authenticated, never cached)
    // =========================================================================

    /// Get the customer's server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &str) -> Result<CartPayload, ApiError> {
        self.send(self.request(Method::GET, "/cart", Some(token)))
            .await
    }

    /// Add units of a product to the cart. Quantities accumulate with any
    /// existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %input.product_id, quantity = input.quantity))]
    pub async fn add_cart_item(
        &self,
        token: &str,
        input: &CartItemInput,
    ) -> Result<CartPayload, ApiError> {
        self.send(
            self.request(Method::POST, "/cart/items", Some(token))
                .json(input),
        )
        .await
    }

    /// Set the quantity of a cart line identified by product id.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in the cart or the request fails.
    #[instrument(skip(self, token), fields(product_id = %input.product_id, quantity = input.quantity))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        input: &CartItemInput,
    ) -> Result<CartPayload, ApiError> {
        self.send(
            self.request(
                Method::PUT,
                &format!("/cart/items/{}", input.product_id),
                Some(token),
            )
            .json(input),
        )
        .await
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the backend no longer has the line;
    /// the cart service decides whether to tolerate that.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_cart_item(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<CartPayload, ApiError> {
        self.send(self.request(
            Method::DELETE,
            &format!("/cart/items/{product_id}"),
            Some(token),
        ))
        .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &str) -> Result<(), ApiError> {
        self.send_ack(self.request(Method::DELETE, "/cart", Some(token)))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_addresses(&self, token: &str) -> Result<Vec<Address>, ApiError> {
        self.send(self.request(Method::GET, "/customers/addresses", Some(token)))
            .await
    }

    /// Create a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, input))]
    pub async fn create_address(
        &self,
        token: &str,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        self.send(
            self.request(Method::POST, "/customers/addresses", Some(token))
                .json(input),
        )
        .await
    }

    /// Replace an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not found or the request fails.
    #[instrument(skip(self, token, input), fields(address_id = %address_id))]
    pub async fn update_address(
        &self,
        token: &str,
        address_id: &AddressId,
        input: &AddressInput,
    ) -> Result<Address, ApiError> {
        self.send(
            self.request(
                Method::PUT,
                &format!("/customers/addresses/{address_id}"),
                Some(token),
            )
            .json(input),
        )
        .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not found or the request fails.
    #[instrument(skip(self, token), fields(address_id = %address_id))]
    pub async fn delete_address(
        &self,
        token: &str,
        address_id: &AddressId,
    ) -> Result<(), ApiError> {
        self.send_ack(self.request(
            Method::DELETE,
            &format!("/customers/addresses/{address_id}"),
            Some(token),
        ))
        .await
        .map(|_| ())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order assembled from the live cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, input), fields(address_id = %input.address_id))]
    pub async fn create_order(&self, token: &str, input: &OrderInput) -> Result<Order, ApiError> {
        self.send(
            self.request(Method::POST, "/orders", Some(token))
                .json(input),
        )
        .await
    }

    /// List the customer's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        self.send(self.request(Method::GET, "/orders/my-orders", Some(token)))
            .await
    }

    /// Get the current status of one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn order_status(
        &self,
        token: &str,
        order_id: &OrderId,
    ) -> Result<OrderStatus, ApiError> {
        let payload: OrderStatusPayload = self
            .send(self.request(
                Method::GET,
                &format!("/orders/{order_id}/status"),
                Some(token),
            ))
            .await?;
        Ok(payload.status)
    }

    // =========================================================================
    // Auth (pass-through; the backend owns credentials and OTP)
    // =========================================================================

    /// Register a new customer. Returns the backend's message, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if registration is rejected or the request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: &RegisterInput) -> Result<Option<String>, ApiError> {
        self.send_ack(
            self.request(Method::POST, "/auth/register", None)
                .json(input),
        )
        .await
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are rejected or the request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: &LoginInput) -> Result<LoginPayload, ApiError> {
        self.send(self.request(Method::POST, "/auth/login", None).json(input))
            .await
    }

    /// Ask the backend to dispatch an OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(phone = %input.phone))]
    pub async fn send_otp(&self, input: &SendOtpInput) -> Result<Option<String>, ApiError> {
        self.send_ack(
            self.request(Method::POST, "/auth/send-otp", None)
                .json(input),
        )
        .await
    }

    /// Verify an OTP; a successful verification returns a logged-in session
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the OTP is rejected or the request fails.
    #[instrument(skip(self, input), fields(phone = %input.phone))]
    pub async fn verify_otp(&self, input: &VerifyOtpInput) -> Result<LoginPayload, ApiError> {
        self.send(
            self.request(Method::POST, "/auth/verify-otp", None)
                .json(input),
        )
        .await
    }

    /// Start the password reset flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn forgot_password(
        &self,
        input: &ForgotPasswordInput,
    ) -> Result<Option<String>, ApiError> {
        self.send_ack(
            self.request(Method::POST, "/auth/forgot-password", None)
                .json(input),
        )
        .await
    }

    /// Complete the password reset flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset is rejected or the request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn reset_password(
        &self,
        input: &ResetPasswordInput,
    ) -> Result<Option<String>, ApiError> {
        self.send_ack(
            self.request(Method::POST, "/auth/reset-password", None)
                .json(input),
        )
        .await
    }

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is rejected; callers must treat
    /// that as a logout.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<super::AuthTokens, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RefreshInput<'a> {
            refresh_token: &'a str,
        }

        self.send(
            self.request(Method::POST, "/auth/refresh-token", None)
                .json(&RefreshInput { refresh_token }),
        )
        .await
    }

    /// Invalidate the session on the backend. Best-effort for callers: the
    /// local session is flushed regardless of this result.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.send_ack(self.request(Method::POST, "/auth/logout", Some(token)))
            .await
            .map(|_| ())
    }
}
