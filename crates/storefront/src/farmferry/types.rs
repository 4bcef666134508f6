//! Wire types for the commerce backend's REST API.
//!
//! The backend is a Node service: payloads are camelCase and entity ids are
//! hex object ids serialized as strings. Ids are documented as `id` but the
//! backend still emits `_id` on some resources, so the id fields accept both
//! spellings via a serde alias. Everything else is one documented schema per
//! endpoint - decoding failures surface as typed errors at the boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use farmferry_core::{
    AddressId, AddressType, CartLineId, CategoryId, CustomerId, Email, OrderId, OrderStatus,
    PaymentMethod, Phone, ProductId, SupplierId,
};

// =============================================================================
// Catalog
// =============================================================================

/// A product as served by the catalog endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// List price in rupees.
    pub price: Decimal,
    /// Promotional price; when present, this is what the customer pays.
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    /// GST rate as a percentage (e.g. 5 for 5%).
    #[serde(default)]
    pub gst_percent: Option<Decimal>,
    /// Units available; `Some(0)` means out of stock, `None` means the
    /// backend did not report stock for this listing.
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    /// Sale unit, e.g. "500 g" or "1 dozen".
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
}

impl Product {
    /// The price the customer actually pays for one unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    /// Whether the backend reports this product as unavailable.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == Some(0)
    }
}

/// A page of products from a listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Query parameters accepted by the product listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Whether this is the unfiltered first-page query (the cacheable one).
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.category.is_none()
            && self.search.is_none()
            && self.page.is_none()
            && self.limit.is_none()
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

// =============================================================================
// Cart
// =============================================================================

/// The authenticated customer's server-side cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    #[serde(default)]
    pub items: Vec<CartLinePayload>,
}

/// One line of the server-side cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePayload {
    /// Backend-issued cart line id.
    #[serde(alias = "_id")]
    pub id: CartLineId,
    /// The full product, embedded so the storefront never needs a second
    /// lookup to price a line.
    pub product: Product,
    pub quantity: u32,
}

/// Body for cart item mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

// =============================================================================
// Customer & auth
// =============================================================================

/// The customer profile attached to an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(alias = "_id")]
    pub id: CustomerId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<Phone>,
}

/// Token pair issued by the backend on login/verify and rotated on refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Payload of a successful login or OTP verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub customer: Customer,
    pub access_token: String,
    pub refresh_token: String,
}

impl LoginPayload {
    /// Split the payload into the customer profile and its token pair.
    #[must_use]
    pub fn into_parts(self) -> (Customer, AuthTokens) {
        (
            self.customer,
            AuthTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
            },
        )
    }
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Phone,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: Email,
    pub password: String,
}

/// OTP dispatch request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpInput {
    pub phone: Phone,
}

/// OTP verification request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpInput {
    pub phone: Phone,
    pub otp: String,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordInput {
    pub email: Email,
}

/// Password reset request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordInput {
    pub email: Email,
    pub otp: String,
    pub new_password: String,
}

// =============================================================================
// Addresses
// =============================================================================

/// Geographic coordinates from the address picker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "_id")]
    pub id: AddressId,
    #[serde(default)]
    pub address_type: AddressType,
    pub full_name: String,
    pub phone: Phone,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub is_default: bool,
}

/// Body for creating or replacing an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default)]
    pub address_type: AddressType,
    pub full_name: String,
    pub phone: Phone,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// Orders
// =============================================================================

/// An order as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub delivery_address: Option<Address>,
    pub created_at: DateTime<Utc>,
}

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: u32,
    /// Unit price at the time the order was placed.
    pub price: Decimal,
}

/// Order creation body, assembled from the live cart immediately before the
/// single POST; the backend owns the order from then on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub items: Vec<OrderItemInput>,
    pub address_id: AddressId,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    pub platform_fee: Decimal,
    pub gst: Decimal,
    pub total_amount: Decimal,
}

/// One line of an order creation body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// Payload of the order status endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusPayload {
    pub status: OrderStatus,
}
