//! Domain models

pub mod client;
pub mod delivery;
pub mod ledger;
pub mod order;
pub mod product;

pub use client::{ClientAccount, NewAccount};
pub use delivery::{Delivery, DeliveryStatus, DeliverySummary};
pub use ledger::{
    CashMovement, CashMovementKind, ClientTransaction, NewCashMovement, TransactionKind,
};
pub use order::{
    CreateOrder, DeliverRequest, ItemInput, Order, OrderFilter, OrderItem, OrderStatus,
    PaymentMethod, PaymentStatus,
};
pub use product::Product;

use serde::{Deserialize, Serialize};

/// Caller identity stamped on orders and ledger entries
///
/// Supplied by the transport layer; authentication itself is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: u64,
    pub user_name: String,
}

impl Principal {
    pub fn new(user_id: u64, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
        }
    }
}
