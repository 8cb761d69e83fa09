//! redb-based storage layer for the fulfillment engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `clients` | `client_id` | `ClientAccount` | Account records with cached balances |
//! | `orders` | `order_id` | `Order` | Order aggregates (items embedded) |
//! | `deliveries` | `delivery_id` | `Delivery` | Dispatch groups |
//! | `client_transactions` | `transaction_id` | `ClientTransaction` | Debt ledger (append-only) |
//! | `cash_movements` | `movement_id` | `CashMovement` | Cash register (append-only) |
//! | `id_counters` | entity name | `u64` | Per-entity id allocation |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns and the
//! database file is always in a consistent state (copy-on-write with
//! atomic pointer swap). A dropped, uncommitted [`WriteTransaction`]
//! aborts cleanly, which is what gives the engine its all-or-nothing
//! multi-entity writes: balances, ledger rows, and order status are
//! written through one transaction and become visible together or not
//! at all.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::AppError;
use shared::error::ErrorCode;
use shared::models::{CashMovement, ClientAccount, ClientTransaction, Delivery, Order};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for client accounts: key = client_id, value = JSON-serialized ClientAccount
const CLIENTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("clients");

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Table for dispatch groups: key = delivery_id, value = JSON-serialized Delivery
const DELIVERIES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("deliveries");

/// Table for the debt ledger: key = transaction_id, value = JSON-serialized ClientTransaction
const CLIENT_TRANSACTIONS_TABLE: TableDefinition<u64, &[u8]> =
    TableDefinition::new("client_transactions");

/// Table for the cash register: key = movement_id, value = JSON-serialized CashMovement
const CASH_MOVEMENTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("cash_movements");

/// Table for id counters: key = entity name, value = last allocated id
const ID_COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("id_counters");

const COUNTER_CLIENT: &str = "client";
const COUNTER_ORDER: &str = "order";
const COUNTER_DELIVERY: &str = "delivery";
const COUNTER_TRANSACTION: &str = "client_transaction";
const COUNTER_MOVEMENT: &str = "cash_movement";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage error");
        match err {
            StorageError::Serialization(e) => {
                AppError::with_message(ErrorCode::SerializationError, e.to_string())
            }
            other => AppError::database(other.to_string()),
        }
    }
}

/// Engine storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl Storage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::initialize(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> StorageResult<Self> {
        // Create all tables up front so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CLIENTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(DELIVERIES_TABLE)?;
            let _ = write_txn.open_table(CLIENT_TRANSACTIONS_TABLE)?;
            let _ = write_txn.open_table(CASH_MOVEMENTS_TABLE)?;
            let _ = write_txn.open_table(ID_COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    ///
    /// redb allows a single write transaction at a time; concurrent
    /// callers serialize here, which is the engine's single-writer
    /// discipline.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Id Allocation ==========

    fn next_id(&self, txn: &WriteTransaction, entity: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(ID_COUNTERS_TABLE)?;
        let current = table.get(entity)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(entity, next)?;
        Ok(next)
    }

    pub fn next_client_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, COUNTER_CLIENT)
    }

    pub fn next_order_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, COUNTER_ORDER)
    }

    pub fn next_delivery_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, COUNTER_DELIVERY)
    }

    pub fn next_transaction_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, COUNTER_TRANSACTION)
    }

    pub fn next_movement_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.next_id(txn, COUNTER_MOVEMENT)
    }

    // ========== Generic helpers ==========

    fn put_record<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        table_def: TableDefinition<u64, &[u8]>,
        id: u64,
        record: &T,
    ) -> StorageResult<()> {
        let bytes = serde_json::to_vec(record)?;
        let mut table = txn.open_table(table_def)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    fn get_record_in_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        table_def: TableDefinition<u64, &[u8]>,
        id: u64,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(table_def)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn remove_record(
        &self,
        txn: &WriteTransaction,
        table_def: TableDefinition<u64, &[u8]>,
        id: u64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(table_def)?;
        table.remove(id)?;
        Ok(())
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        table_def: TableDefinition<u64, &[u8]>,
        id: u64,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn list_records<T: DeserializeOwned>(
        &self,
        table_def: TableDefinition<u64, &[u8]>,
    ) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def)?;
        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    // ========== Clients ==========

    pub fn put_client(&self, txn: &WriteTransaction, client: &ClientAccount) -> StorageResult<()> {
        self.put_record(txn, CLIENTS_TABLE, client.id, client)
    }

    pub fn client_in_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StorageResult<Option<ClientAccount>> {
        self.get_record_in_txn(txn, CLIENTS_TABLE, id)
    }

    pub fn get_client(&self, id: u64) -> StorageResult<Option<ClientAccount>> {
        self.get_record(CLIENTS_TABLE, id)
    }

    pub fn list_clients(&self) -> StorageResult<Vec<ClientAccount>> {
        self.list_records(CLIENTS_TABLE)
    }

    /// Find an account with the same name and address (anti-duplicate rule)
    pub fn find_client_by_identity(
        &self,
        txn: &WriteTransaction,
        name: &str,
        address: &str,
    ) -> StorageResult<Option<ClientAccount>> {
        let table = txn.open_table(CLIENTS_TABLE)?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let client: ClientAccount = serde_json::from_slice(value.value())?;
            if client.name == name && client.address == address {
                return Ok(Some(client));
            }
        }
        Ok(None)
    }

    // ========== Orders ==========

    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        self.put_record(txn, ORDERS_TABLE, order.id, order)
    }

    pub fn order_in_txn(&self, txn: &WriteTransaction, id: u64) -> StorageResult<Option<Order>> {
        self.get_record_in_txn(txn, ORDERS_TABLE, id)
    }

    pub fn remove_order(&self, txn: &WriteTransaction, id: u64) -> StorageResult<()> {
        self.remove_record(txn, ORDERS_TABLE, id)
    }

    pub fn get_order(&self, id: u64) -> StorageResult<Option<Order>> {
        self.get_record(ORDERS_TABLE, id)
    }

    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        self.list_records(ORDERS_TABLE)
    }

    // ========== Deliveries ==========

    pub fn put_delivery(&self, txn: &WriteTransaction, delivery: &Delivery) -> StorageResult<()> {
        self.put_record(txn, DELIVERIES_TABLE, delivery.id, delivery)
    }

    pub fn delivery_in_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StorageResult<Option<Delivery>> {
        self.get_record_in_txn(txn, DELIVERIES_TABLE, id)
    }

    pub fn remove_delivery(&self, txn: &WriteTransaction, id: u64) -> StorageResult<()> {
        self.remove_record(txn, DELIVERIES_TABLE, id)
    }

    pub fn get_delivery(&self, id: u64) -> StorageResult<Option<Delivery>> {
        self.get_record(DELIVERIES_TABLE, id)
    }

    pub fn list_deliveries(&self) -> StorageResult<Vec<Delivery>> {
        self.list_records(DELIVERIES_TABLE)
    }

    // ========== Ledger (append-only) ==========

    /// Append a client transaction. No update or remove exists for this
    /// table: entries are the accounting audit trail.
    pub fn append_client_transaction(
        &self,
        txn: &WriteTransaction,
        entry: &ClientTransaction,
    ) -> StorageResult<()> {
        self.put_record(txn, CLIENT_TRANSACTIONS_TABLE, entry.id, entry)
    }

    /// Append a cash movement. Same immutability contract as client
    /// transactions.
    pub fn append_cash_movement(
        &self,
        txn: &WriteTransaction,
        entry: &CashMovement,
    ) -> StorageResult<()> {
        self.put_record(txn, CASH_MOVEMENTS_TABLE, entry.id, entry)
    }

    pub fn list_client_transactions(&self, client_id: u64) -> StorageResult<Vec<ClientTransaction>> {
        let all: Vec<ClientTransaction> = self.list_records(CLIENT_TRANSACTIONS_TABLE)?;
        Ok(all.into_iter().filter(|t| t.client_id == client_id).collect())
    }

    pub fn list_cash_movements(&self) -> StorageResult<Vec<CashMovement>> {
        self.list_records(CASH_MOVEMENTS_TABLE)
    }
}
