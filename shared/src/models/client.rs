//! Client account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client account entity
///
/// `balance` and `bottles_balance` are cached projections of the ledger:
/// they are only ever written inside the same storage transaction as the
/// ledger entry (or delivery) that justifies the change. There is no public
/// setter for either field anywhere in the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAccount {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Delivery zone label (free text)
    pub zone: Option<String>,
    /// Running debt: positive = client owes money, negative = credit in
    /// their favor
    pub balance: f64,
    /// Returnable containers currently held: positive = client owes
    /// containers
    pub bottles_balance: i64,
    pub created_at: DateTime<Utc>,
}

/// Create account payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub zone: Option<String>,
}
