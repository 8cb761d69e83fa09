//! Dispatch group (reparto) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dispatch group status
///
/// The engine only ever writes `Pending`; member-order progress is derived
/// on read (`DeliverySummary`), never cached into this field. The remaining
/// variants exist for route management outside the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    Failed,
}

/// Dispatch group: a batch of orders released together
///
/// Holds order references only; it never owns the orders' lifecycle, and
/// deleting a group releases its members instead of deleting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: u64,
    pub status: DeliveryStatus,
    pub notes: Option<String>,
    pub order_ids: Vec<u64>,
    pub created_at: DateTime<Utc>,
}

/// Dispatch group with progress counters derived fresh on each read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySummary {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub orders_count: usize,
    /// Member orders whose status is DELIVERED
    pub delivered_count: usize,
}
