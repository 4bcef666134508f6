//! Status enums for orders, payments, and addresses.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The commerce backend owns order state; the storefront only displays it
/// and polls `/orders/:id/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Payment method selected at checkout.
///
/// Settlement happens on the backend; the storefront only forwards the
/// customer's choice with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// UPI transfer.
    Upi,
    /// Card or net-banking via the payment gateway.
    Online,
}

/// Address book label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).expect("serialize"),
            "\"out_for_delivery\""
        );
        let status: OrderStatus =
            serde_json::from_str("\"delivered\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Delivered);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());
    }

    #[test]
    fn test_payment_method_serde_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).expect("serialize"),
            "\"cod\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Upi).expect("serialize"),
            "\"upi\""
        );
    }

    #[test]
    fn test_address_type_default() {
        assert_eq!(AddressType::default(), AddressType::Home);
    }
}
