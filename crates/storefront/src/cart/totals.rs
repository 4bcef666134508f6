//! Derived cart totals.
//!
//! Pure functions over the cart's lines; every rupee amount is a
//! [`Decimal`]. Pricing rules:
//!
//! - Delivery is free at or above the subtotal threshold, otherwise flat.
//! - The platform fee is flat per order.
//! - GST is computed per line from the product's rate and summed.
//! - An empty cart carries no fees at all.

use rust_decimal::Decimal;
use serde::Serialize;

use farmferry_core::Price;

use super::CartLine;

/// Subtotal at or above which delivery is free.
pub const FREE_DELIVERY_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Flat delivery charge below the free-delivery threshold.
pub const DELIVERY_CHARGE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Flat per-order platform fee.
pub const PLATFORM_FEE: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Totals derived from the cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub gst: Decimal,
    pub delivery_charge: Decimal,
    pub platform_fee: Decimal,
    pub grand_total: Decimal,
    pub is_free_delivery: bool,
    pub item_count: u32,
}

impl CartTotals {
    /// Totals for an empty cart: all zeros, no fees.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            gst: Decimal::ZERO,
            delivery_charge: Decimal::ZERO,
            platform_fee: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            is_free_delivery: false,
            item_count: 0,
        }
    }

    /// Compute totals over the given lines.
    #[must_use]
    pub fn compute(lines: &[CartLine]) -> Self {
        if lines.is_empty() {
            return Self::empty();
        }

        let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
        let gst: Decimal = lines
            .iter()
            .map(|line| line.line_total() * line.gst_percent / HUNDRED)
            .sum();

        let is_free_delivery = subtotal >= FREE_DELIVERY_THRESHOLD;
        let delivery_charge = if is_free_delivery {
            Decimal::ZERO
        } else {
            DELIVERY_CHARGE
        };

        Self {
            subtotal,
            gst,
            delivery_charge,
            platform_fee: PLATFORM_FEE,
            grand_total: subtotal + delivery_charge + PLATFORM_FEE + gst,
            is_free_delivery,
            item_count: lines.iter().map(|line| line.quantity).sum(),
        }
    }

    /// The grand total as a display price (e.g. `₹222.00`).
    #[must_use]
    pub fn grand_total_display(&self) -> String {
        Price::new(self.grand_total).to_string()
    }
}

#[cfg(test)]
mod tests {
    use farmferry_core::{CartLineId, ProductId};

    use super::*;

    fn line(product_id: &str, price: i64, discounted: Option<i64>, gst: i64, qty: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(product_id),
            line_id: CartLineId::new(format!("line-{product_id}")),
            name: format!("product {product_id}"),
            image_url: None,
            unit: None,
            quantity: qty,
            price: Decimal::new(price, 0),
            discounted_price: discounted.map(|d| Decimal::new(d, 0)),
            gst_percent: Decimal::new(gst, 0),
            stock_quantity: None,
        }
    }

    #[test]
    fn test_empty_cart_is_all_zeros() {
        let totals = CartTotals::compute(&[]);
        assert_eq!(totals, CartTotals::empty());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.grand_total, Decimal::ZERO);
        assert!(!totals.is_free_delivery);
    }

    #[test]
    fn test_subtotal_prefers_discounted_price() {
        let lines = vec![line("a", 100, Some(80), 0, 2), line("b", 50, None, 0, 1)];
        let totals = CartTotals::compute(&lines);
        assert_eq!(totals.subtotal, Decimal::new(210, 0));
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_delivery_charged_below_threshold() {
        let totals = CartTotals::compute(&[line("a", 100, None, 0, 2)]);
        assert!(!totals.is_free_delivery);
        assert_eq!(totals.delivery_charge, Decimal::new(20, 0));
    }

    #[test]
    fn test_delivery_free_at_threshold() {
        let totals = CartTotals::compute(&[line("a", 100, None, 0, 5)]);
        assert_eq!(totals.subtotal, Decimal::new(500, 0));
        assert!(totals.is_free_delivery);
        assert_eq!(totals.delivery_charge, Decimal::ZERO);
    }

    #[test]
    fn test_gst_per_line_summed() {
        // 5% on 200 and 12% on 100
        let lines = vec![line("a", 100, None, 5, 2), line("b", 100, None, 12, 1)];
        let totals = CartTotals::compute(&lines);
        assert_eq!(totals.gst, Decimal::new(22, 0));
    }

    #[test]
    fn test_checkout_scenario() {
        // One item at ₹100 x 2: subtotal 200, delivery 20, platform fee 2,
        // no GST -> grand total 222.
        let totals = CartTotals::compute(&[line("a", 100, None, 0, 2)]);
        assert_eq!(totals.subtotal, Decimal::new(200, 0));
        assert_eq!(totals.delivery_charge, Decimal::new(20, 0));
        assert_eq!(totals.platform_fee, Decimal::new(2, 0));
        assert_eq!(totals.gst, Decimal::ZERO);
        assert_eq!(totals.grand_total, Decimal::new(222, 0));
        assert_eq!(totals.grand_total_display(), "\u{20b9}222.00");
    }
}
