//! Shared types for the fulfillment engine
//!
//! Domain models and the unified error framework, consumed by the engine
//! crate and by whatever transport layer sits in front of it.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::Principal;
