//! Client debt ledger and cash register
//!
//! Accounts carry a cached `balance` (positive = client owes); the
//! append-only transaction log is the source of truth and the cached
//! value always equals the recomputed DEBIT − CREDIT sum because every
//! mutation goes through one write transaction here or in the orders
//! engine.

use crate::orders::money;
use crate::storage::{Storage, StorageError};
use chrono::{NaiveDate, Utc};
use shared::models::{
    CashMovement, CashMovementKind, ClientAccount, ClientTransaction, NewAccount, NewCashMovement,
    TransactionKind,
};
use shared::{AppError, AppResult, Principal};

/// Debt ledger and cash register service
pub struct LedgerService {
    storage: Storage,
}

impl LedgerService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    // ========== Accounts ==========

    /// Create a client account, or return the existing one with the same
    /// name and address
    ///
    /// New accounts start with zero debt and zero bottles.
    pub fn create_account(&self, input: NewAccount) -> AppResult<ClientAccount> {
        let name = input.name.trim();
        let address = input.address.trim();
        if name.is_empty() {
            return Err(AppError::invalid_argument("name must not be empty"));
        }
        if address.is_empty() {
            return Err(AppError::invalid_argument("address must not be empty"));
        }

        let txn = self.storage.begin_write()?;
        if let Some(existing) = self.storage.find_client_by_identity(&txn, name, address)? {
            tracing::info!(client_id = existing.id, "Account already exists, reusing");
            return Ok(existing);
        }

        let account = ClientAccount {
            id: self.storage.next_client_id(&txn)?,
            name: name.to_string(),
            address: address.to_string(),
            phone: input.phone,
            zone: input.zone,
            balance: 0.0,
            bottles_balance: 0,
            created_at: Utc::now(),
        };
        self.storage.put_client(&txn, &account)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(client_id = account.id, name = %account.name, "Account created");
        Ok(account)
    }

    pub fn get_account(&self, client_id: u64) -> AppResult<ClientAccount> {
        self.storage
            .get_client(client_id)?
            .ok_or_else(|| AppError::not_found(format!("Client {}", client_id)))
    }

    pub fn list_accounts(&self) -> AppResult<Vec<ClientAccount>> {
        let mut accounts = self.storage.list_clients()?;
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    // ========== Debt ledger ==========

    /// Record a payment against the client's debt (CREDIT entry)
    ///
    /// The balance may go negative: that is credit in the client's favor,
    /// not an error.
    pub fn record_payment(
        &self,
        principal: &Principal,
        client_id: u64,
        amount: f64,
        description: Option<String>,
    ) -> AppResult<ClientTransaction> {
        self.apply_entry(
            principal,
            client_id,
            TransactionKind::Credit,
            amount,
            "Pago recibido".to_string(),
            description.or_else(|| Some("Pago a cuenta".to_string())),
        )
    }

    /// Record a manual charge on the client's account (DEBIT entry)
    pub fn record_charge(
        &self,
        principal: &Principal,
        client_id: u64,
        amount: f64,
        description: Option<String>,
    ) -> AppResult<ClientTransaction> {
        self.apply_entry(
            principal,
            client_id,
            TransactionKind::Debit,
            amount,
            "Cargo manual".to_string(),
            description.or_else(|| Some("Cargo extra".to_string())),
        )
    }

    fn apply_entry(
        &self,
        principal: &Principal,
        client_id: u64,
        kind: TransactionKind,
        amount: f64,
        concept: String,
        description: Option<String>,
    ) -> AppResult<ClientTransaction> {
        money::validate_amount(amount)?;

        let txn = self.storage.begin_write()?;
        let mut client = self
            .storage
            .client_in_txn(&txn, client_id)?
            .ok_or_else(|| AppError::not_found(format!("Client {}", client_id)))?;

        let entry = ClientTransaction {
            id: self.storage.next_transaction_id(&txn)?,
            client_id,
            kind,
            amount,
            concept,
            description,
            reference_id: None,
            created_by: principal.user_id,
            created_at: Utc::now(),
        };
        client.balance = match kind {
            TransactionKind::Debit => money::add(client.balance, amount),
            TransactionKind::Credit => money::sub(client.balance, amount),
        };

        self.storage.append_client_transaction(&txn, &entry)?;
        self.storage.put_client(&txn, &client)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            client_id,
            kind = ?entry.kind,
            amount,
            balance = client.balance,
            "Ledger entry recorded"
        );
        Ok(entry)
    }

    /// Transaction history for one client, newest first
    pub fn transactions(&self, client_id: u64) -> AppResult<Vec<ClientTransaction>> {
        if self.storage.get_client(client_id)?.is_none() {
            return Err(AppError::not_found(format!("Client {}", client_id)));
        }
        let mut entries = self.storage.list_client_transactions(client_id)?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Recompute the client's balance from the full transaction log
    ///
    /// Diagnostic companion to the cached `balance` field; the two must
    /// agree.
    pub fn recomputed_balance(&self, client_id: u64) -> AppResult<f64> {
        let entries = self.storage.list_client_transactions(client_id)?;
        let mut balance = 0.0;
        for entry in &entries {
            balance = match entry.kind {
                TransactionKind::Debit => money::add(balance, entry.amount),
                TransactionKind::Credit => money::sub(balance, entry.amount),
            };
        }
        Ok(balance)
    }

    // ========== Cash register ==========

    /// Record a manual income or expense in the cash register
    pub fn record_cash_movement(
        &self,
        principal: &Principal,
        input: NewCashMovement,
    ) -> AppResult<CashMovement> {
        money::validate_amount(input.amount)?;
        if input.concept.trim().is_empty() {
            return Err(AppError::invalid_argument("concept must not be empty"));
        }

        let txn = self.storage.begin_write()?;
        let entry = CashMovement {
            id: self.storage.next_movement_id(&txn)?,
            amount: input.amount,
            kind: input.kind,
            concept: input.concept,
            description: input.description,
            payment_method: input.payment_method,
            reference_id: None,
            created_by: principal.user_id,
            created_at: Utc::now(),
        };
        self.storage.append_cash_movement(&txn, &entry)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            movement_id = entry.id,
            kind = ?entry.kind,
            amount = entry.amount,
            "Cash movement recorded"
        );
        Ok(entry)
    }

    /// Cash movements recorded on one calendar day (UTC), newest first
    pub fn cash_movements_on(&self, date: NaiveDate) -> AppResult<Vec<CashMovement>> {
        let mut entries: Vec<CashMovement> = self
            .storage
            .list_cash_movements()?
            .into_iter()
            .filter(|m| m.created_at.date_naive() == date)
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Net cash position: income minus expense over the whole register
    pub fn cash_balance(&self) -> AppResult<f64> {
        let mut balance = 0.0;
        for entry in &self.storage.list_cash_movements()? {
            balance = match entry.kind {
                CashMovementKind::Income => money::add(balance, entry.amount),
                CashMovementKind::Expense => money::sub(balance, entry.amount),
            };
        }
        Ok(balance)
    }
}
