//! Fulfillment engine - order lifecycle and ledger consistency core
//!
//! The state machine governing an order from draft to delivery or
//! cancellation, and the atomic accounting side effects (client debt
//! ledger, cash register, returnable-container tracking) triggered by
//! state transitions.
//!
//! # Module structure
//!
//! ```text
//! fulfillment-engine/src/
//! ├── storage.rs   # redb-backed transactional store
//! ├── orders/      # order lifecycle engine + money arithmetic
//! ├── ledger.rs    # client account ledger + cash register
//! ├── dispatch.rs  # delivery grouping (repartos)
//! ├── catalog.rs   # in-memory product catalog collaborator
//! └── logger.rs    # tracing subscriber setup
//! ```
//!
//! Every multi-entity operation (delivery fan-out, group creation, group
//! deletion, order deletion) executes inside a single redb write
//! transaction: all of its writes commit together or none do, and the
//! exclusive write transaction doubles as the conditional-update boundary
//! that makes `deliver` idempotent under concurrent callers.

pub mod catalog;
pub mod dispatch;
pub mod ledger;
pub mod logger;
pub mod orders;
pub mod storage;

// Re-export public types
pub use catalog::Catalog;
pub use dispatch::DispatchService;
pub use ledger::LedgerService;
pub use orders::OrdersEngine;
pub use storage::{Storage, StorageError, StorageResult};

// Re-export logger functions
pub use logger::{init_logger, init_logger_with_file};
