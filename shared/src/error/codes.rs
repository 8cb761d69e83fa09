//! Unified error codes for the fulfillment engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order / dispatch errors
//! - 5xxx: Ledger errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid argument supplied by the caller
    InvalidArgument = 5,

    // ==================== 4xxx: Order / Dispatch ====================
    /// Operation is illegal for the order's current status
    OrderInvalidState = 4001,
    /// Order already belongs to a dispatch group
    OrderAlreadyGrouped = 4002,

    // ==================== 5xxx: Ledger ====================
    /// Ledger amount must be positive and finite
    LedgerInvalidAmount = 5001,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Serialization error
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidArgument => "Invalid argument",
            Self::OrderInvalidState => "Operation not allowed in current order status",
            Self::OrderAlreadyGrouped => "Order already belongs to a dispatch group",
            Self::LedgerInvalidAmount => "Amount must be positive",
            Self::InternalError => "Internal error",
            Self::DatabaseError => "Database error",
            Self::SerializationError => "Serialization error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidArgument),
            4001 => Ok(Self::OrderInvalidState),
            4002 => Ok(Self::OrderAlreadyGrouped),
            5001 => Ok(Self::LedgerInvalidAmount),
            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::SerializationError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
