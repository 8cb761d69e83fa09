//! Product model (catalog collaborator)

use serde::{Deserialize, Serialize};

/// Product entity as served by the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    /// Short unique code used on receipts and dispatch sheets
    pub code: String,
    /// List price; order items carry their own negotiated unit price
    pub price: f64,
    /// Containers of this product must come back (bidones, siphons)
    pub is_returnable: bool,
}
