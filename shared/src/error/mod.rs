//! Unified error system
//!
//! - [`ErrorCode`]: standardized error codes for all failure kinds
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order / dispatch errors
//! - 5xxx: Ledger errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::not_found("Order 42");
//! assert_eq!(err.code, ErrorCode::NotFound);
//!
//! let err = AppError::invalid_state("only DRAFT orders can be confirmed")
//!     .with_detail("status", "DELIVERED");
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
