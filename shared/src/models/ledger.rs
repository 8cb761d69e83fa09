//! Immutable ledger entries: client transactions and cash movements
//!
//! Both record types are append-only accounting audit trail. The engine
//! exposes no update or delete operation for either.

use super::order::PaymentMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a client ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Increases client debt (purchase, manual charge)
    Debit,
    /// Decreases client debt (payment received)
    Credit,
}

/// Client ledger entry
///
/// `amount` is always non-negative; the sign meaning is carried by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientTransaction {
    pub id: u64,
    pub client_id: u64,
    pub kind: TransactionKind,
    pub amount: f64,
    pub concept: String,
    pub description: Option<String>,
    /// Originating order, when the entry was produced by a delivery
    pub reference_id: Option<u64>,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
}

/// Direction of a cash register movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashMovementKind {
    Income,
    Expense,
}

/// Cash register entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: u64,
    pub amount: f64,
    pub kind: CashMovementKind,
    pub concept: String,
    /// Free-text notes; carries the transfer reference when one was given
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
    /// Originating order, when the entry was produced by a delivery
    pub reference_id: Option<u64>,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
}

/// Manual cash movement payload (expenses, out-of-band income)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCashMovement {
    pub amount: f64,
    pub kind: CashMovementKind,
    pub concept: String,
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
}
