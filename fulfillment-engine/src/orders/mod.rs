//! Order lifecycle engine
//!
//! State machine DRAFT → CONFIRMED → DELIVERED / CANCELLED and the atomic
//! delivery fan-out into the client account and the ledgers.

mod engine;
pub mod money;

pub use engine::OrdersEngine;

#[cfg(test)]
mod tests;
