//! OrdersEngine - lifecycle state machine and atomic delivery fan-out
//!
//! # Delivery flow
//!
//! ```text
//! deliver(order_id, request)
//!     ├─ 1. Begin write transaction (exclusive writer)
//!     ├─ 2. Load order; if already DELIVERED → return it, no writes
//!     ├─ 3. Load client account
//!     ├─ 4. Compute borrowed bottles from returnable items
//!     ├─ 5. Select the ledger effect from the payment method
//!     ├─ 6. Apply: order status + client balances + ONE ledger entry
//!     ├─ 7. Commit (all-or-nothing)
//!     └─ 8. Return the delivered order
//! ```
//!
//! The idempotency check runs on the order row read *inside* the write
//! transaction. redb admits one write transaction at a time, so two
//! concurrent `deliver` calls serialize: the loser observes DELIVERED and
//! returns without touching the ledger.

use super::money;
use crate::catalog::Catalog;
use crate::storage::{Storage, StorageError};
use chrono::Utc;
use shared::models::{
    CashMovement, CashMovementKind, ClientTransaction, CreateOrder, DeliverRequest, ItemInput,
    Order, OrderFilter, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, TransactionKind,
};
use shared::{AppError, AppResult, Principal};
use std::sync::Arc;

/// The ledger side effect of a delivery, keyed by payment method
///
/// Each variant produces exactly one ledger entry; selecting the variant
/// up front keeps the commit logic in one place.
enum LedgerEffect {
    /// CURRENT_ACCOUNT: DEBIT on the client ledger, debt grows
    OnAccount,
    /// Cash / transfer / mixed: INCOME on the cash register
    Collected,
}

impl LedgerEffect {
    fn for_method(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::CurrentAccount => Self::OnAccount,
            PaymentMethod::Cash | PaymentMethod::Transfer | PaymentMethod::Mixed => Self::Collected,
        }
    }
}

/// Order lifecycle engine
pub struct OrdersEngine {
    storage: Storage,
    catalog: Arc<Catalog>,
}

impl OrdersEngine {
    pub fn new(storage: Storage, catalog: Arc<Catalog>) -> Self {
        Self { storage, catalog }
    }

    /// Create a new order in DRAFT with the supplied items
    ///
    /// The total is computed from the supplied items with Decimal
    /// accumulation and persisted alongside them in the same transaction.
    pub fn create(&self, principal: &Principal, input: CreateOrder) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::invalid_argument("order needs at least one item"));
        }

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            money::validate_item(item)?;
            if !self.catalog.contains(item.product_id) {
                return Err(AppError::not_found(format!("Product {}", item.product_id)));
            }
            items.push(OrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: money::line_subtotal(item.quantity, item.unit_price),
            });
        }
        let total_amount = money::items_total(&items);

        let txn = self.storage.begin_write()?;
        if self.storage.client_in_txn(&txn, input.client_id)?.is_none() {
            return Err(AppError::not_found(format!("Client {}", input.client_id)));
        }

        let id = self.storage.next_order_id(&txn)?;
        let order = Order {
            id,
            client_id: input.client_id,
            status: OrderStatus::Draft,
            items,
            total_amount,
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            payment_amount: 0.0,
            notes: input.notes,
            delivery_id: None,
            created_by: principal.user_id,
            created_at: Utc::now(),
            paid_at: None,
            delivered_at: None,
        };
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = order.id,
            client_id = order.client_id,
            total = order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Append an item to a DRAFT order
    ///
    /// The total is maintained incrementally: every item addition goes
    /// through here, so the stored total never drifts from the item sum.
    pub fn add_item(&self, order_id: u64, item: ItemInput) -> AppResult<Order> {
        money::validate_item(&item)?;
        if !self.catalog.contains(item.product_id) {
            return Err(AppError::not_found(format!("Product {}", item.product_id)));
        }

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .order_in_txn(&txn, order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if order.status != OrderStatus::Draft {
            return Err(AppError::invalid_state(format!(
                "cannot modify order {} in status {:?}",
                order_id, order.status
            )));
        }

        let subtotal = money::line_subtotal(item.quantity, item.unit_price);
        order.items.push(OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal,
        });
        order.total_amount = money::add(order.total_amount, subtotal);

        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, subtotal, total = order.total_amount, "Item added");
        Ok(order)
    }

    /// Confirm a DRAFT order
    pub fn confirm(&self, order_id: u64) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .order_in_txn(&txn, order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if order.status != OrderStatus::Draft {
            return Err(AppError::invalid_state(format!(
                "only DRAFT orders can be confirmed, order {} is {:?}",
                order_id, order.status
            )));
        }

        order.status = OrderStatus::Confirmed;
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, "Order confirmed");
        Ok(order)
    }

    /// Cancel an order
    ///
    /// Legal from DRAFT or CONFIRMED. Cancelling a CANCELLED order is a
    /// no-op success; cancelling a DELIVERED order is an error.
    pub fn cancel(&self, order_id: u64) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .order_in_txn(&txn, order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        match order.status {
            OrderStatus::Delivered => {
                return Err(AppError::invalid_state(format!(
                    "order {} is already delivered and cannot be cancelled",
                    order_id
                )));
            }
            OrderStatus::Cancelled => return Ok(order),
            OrderStatus::Draft | OrderStatus::Confirmed => {}
        }

        order.status = OrderStatus::Cancelled;
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, "Order cancelled");
        Ok(order)
    }

    /// Mark an order DELIVERED and apply the accounting side effects
    ///
    /// Atomic: order status, client balances, and exactly one ledger entry
    /// (DEBIT transaction or cash INCOME) commit together or not at all.
    /// Idempotent: a second call on a DELIVERED order returns it unchanged
    /// with no duplicate side effects.
    pub fn deliver(
        &self,
        principal: &Principal,
        order_id: u64,
        request: DeliverRequest,
    ) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .order_in_txn(&txn, order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        // Idempotency takes priority over any validation, argument checks
        // included. The transaction drops uncommitted: no writes happened.
        if order.status == OrderStatus::Delivered {
            tracing::warn!(order_id, "Deliver replay on already delivered order");
            return Ok(order);
        }

        if request.returned_bottles < 0 {
            return Err(AppError::invalid_argument(format!(
                "returned_bottles must be non-negative, got {}",
                request.returned_bottles
            )));
        }

        let mut client = self
            .storage
            .client_in_txn(&txn, order.client_id)?
            .ok_or_else(|| AppError::not_found(format!("Client {}", order.client_id)))?;

        // Returnable containers handed out with this order
        let borrowed_bottles: i64 = order
            .items
            .iter()
            .filter(|item| self.catalog.is_returnable(item.product_id))
            .map(|item| item.quantity)
            .sum();
        client.bottles_balance += borrowed_bottles - request.returned_bottles;

        let now = Utc::now();
        order.status = OrderStatus::Delivered;
        order.payment_method = Some(request.payment_method);
        order.paid_at = Some(now);
        order.delivered_at = Some(now);

        match LedgerEffect::for_method(request.payment_method) {
            LedgerEffect::OnAccount => {
                order.payment_status = PaymentStatus::OnAccount;

                let entry = ClientTransaction {
                    id: self.storage.next_transaction_id(&txn)?,
                    client_id: client.id,
                    kind: TransactionKind::Debit,
                    amount: order.total_amount,
                    concept: format!("Pedido #{} (Entregado)", order.id),
                    description: Some(
                        request
                            .notes
                            .clone()
                            .unwrap_or_else(|| "Venta a Cuenta Corriente".to_string()),
                    ),
                    reference_id: Some(order.id),
                    created_by: principal.user_id,
                    created_at: now,
                };
                self.storage.append_client_transaction(&txn, &entry)?;
                client.balance = money::add(client.balance, order.total_amount);
            }
            LedgerEffect::Collected => {
                order.payment_status = PaymentStatus::Paid;
                order.payment_amount = order.total_amount;

                let mut description = request.notes.clone();
                if let Some(transfer_ref) = &request.transfer_ref {
                    description = Some(match description {
                        Some(notes) => format!("{} Ref: {}", notes, transfer_ref),
                        None => format!("Ref: {}", transfer_ref),
                    });
                }
                let entry = CashMovement {
                    id: self.storage.next_movement_id(&txn)?,
                    amount: order.total_amount,
                    kind: CashMovementKind::Income,
                    concept: format!("Cobro Pedido #{}", order.id),
                    description,
                    payment_method: request.payment_method,
                    reference_id: Some(order.id),
                    created_by: principal.user_id,
                    created_at: now,
                };
                self.storage.append_cash_movement(&txn, &entry)?;
            }
        }

        self.storage.put_client(&txn, &client)?;
        self.storage.put_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id,
            client_id = client.id,
            payment_method = ?request.payment_method,
            total = order.total_amount,
            borrowed_bottles,
            returned_bottles = request.returned_bottles,
            "Order delivered"
        );
        Ok(order)
    }

    /// Delete a DRAFT or CONFIRMED order
    ///
    /// Removes the order with its items (one logical unit) and releases
    /// its membership in any dispatch group. DELIVERED orders are part of
    /// the accounting trail and cannot be deleted.
    pub fn delete(&self, order_id: u64) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        let order = self
            .storage
            .order_in_txn(&txn, order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if order.status == OrderStatus::Delivered {
            return Err(AppError::invalid_state(format!(
                "order {} is already delivered and cannot be deleted",
                order_id
            )));
        }

        if let Some(delivery_id) = order.delivery_id
            && let Some(mut delivery) = self.storage.delivery_in_txn(&txn, delivery_id)?
        {
            delivery.order_ids.retain(|&id| id != order_id);
            self.storage.put_delivery(&txn, &delivery)?;
        }

        self.storage.remove_order(&txn, order_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    /// Get an order by id
    pub fn get(&self, order_id: u64) -> AppResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))
    }

    /// List orders, optionally filtered by client and status, newest first
    pub fn list(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .list_orders()?
            .into_iter()
            .filter(|o| filter.client_id.is_none_or(|c| o.client_id == c))
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}
