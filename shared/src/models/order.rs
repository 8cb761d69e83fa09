//! Order aggregate and lifecycle payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Still being assembled, items mutable
    #[default]
    Draft,
    /// Locked for dispatch, items frozen
    Confirmed,
    /// Terminal: handed over and settled
    Delivered,
    /// Terminal: abandoned before delivery
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further status or item mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// How the client settled (or deferred) the order at delivery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    /// Store-credit-style deferred payment; increases client debt
    CurrentAccount,
    Transfer,
    Mixed,
}

/// Payment settlement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    OnAccount,
}

/// Order line item
///
/// Owned exclusively by its order; created with the order or appended
/// while the order is still DRAFT.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: u64,
    pub quantity: i64,
    pub unit_price: f64,
    /// quantity × unit_price, rounded to 2 decimals at creation
    pub subtotal: f64,
}

/// Order aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Immutable after creation
    pub client_id: u64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Maintained incrementally; equals the sum of item subtotals while
    /// the order is DRAFT or CONFIRMED
    pub total_amount: f64,
    /// Set only at delivery
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    /// Amount collected immediately; stays 0 for ON_ACCOUNT sales
    pub payment_amount: f64,
    pub notes: Option<String>,
    /// Dispatch group membership (at most one)
    pub delivery_id: Option<u64>,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Line item input for order creation / item append
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub product_id: u64,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub client_id: u64,
    pub items: Vec<ItemInput>,
    pub notes: Option<String>,
}

/// Delivery request for a single order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverRequest {
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Bank transfer reference, recorded on the cash movement when present
    pub transfer_ref: Option<String>,
    /// Empty returnable containers handed back by the client
    pub returned_bottles: i64,
}

/// Filter for order listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub client_id: Option<u64>,
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"DELIVERED\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CurrentAccount).unwrap(),
            "\"CURRENT_ACCOUNT\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::OnAccount).unwrap(),
            "\"ON_ACCOUNT\""
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Draft.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
    }
}
