//! Dispatch groups: batching orders for a delivery run
//!
//! A group is a named set of orders going out together. Membership is
//! exclusive (an order belongs to at most one group) and grouping never
//! changes order lifecycle state; orders are still delivered one by one
//! through the orders engine.

use crate::storage::{Storage, StorageError};
use chrono::Utc;
use shared::models::{Delivery, DeliveryStatus, DeliverySummary, OrderStatus};
use shared::{AppError, AppResult};

/// Dispatch group service
pub struct DispatchService {
    storage: Storage,
}

impl DispatchService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Create a dispatch group from a set of orders
    ///
    /// Every order is validated before any write: all must exist and none
    /// may already belong to a group. Duplicate ids in the input collapse
    /// to one membership.
    pub fn create_group(&self, order_ids: &[u64], notes: Option<String>) -> AppResult<Delivery> {
        if order_ids.is_empty() {
            return Err(AppError::invalid_argument(
                "a dispatch group needs at least one order",
            ));
        }
        let mut member_ids: Vec<u64> = order_ids.to_vec();
        member_ids.sort_unstable();
        member_ids.dedup();

        let txn = self.storage.begin_write()?;

        // Validate the whole set before touching anything
        let mut members = Vec::with_capacity(member_ids.len());
        for &order_id in &member_ids {
            let order = self
                .storage
                .order_in_txn(&txn, order_id)?
                .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;
            if let Some(existing) = order.delivery_id {
                return Err(AppError::conflict(format!(
                    "order {} already belongs to delivery {}",
                    order_id, existing
                )));
            }
            members.push(order);
        }

        let delivery = Delivery {
            id: self.storage.next_delivery_id(&txn)?,
            status: DeliveryStatus::Pending,
            notes,
            order_ids: member_ids,
            created_at: Utc::now(),
        };
        for mut order in members {
            order.delivery_id = Some(delivery.id);
            self.storage.put_order(&txn, &order)?;
        }
        self.storage.put_delivery(&txn, &delivery)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            delivery_id = delivery.id,
            orders = delivery.order_ids.len(),
            "Dispatch group created"
        );
        Ok(delivery)
    }

    pub fn get_group(&self, delivery_id: u64) -> AppResult<DeliverySummary> {
        let delivery = self
            .storage
            .get_delivery(delivery_id)?
            .ok_or_else(|| AppError::not_found(format!("Delivery {}", delivery_id)))?;
        self.summarize(delivery)
    }

    /// List dispatch groups, optionally by status, newest first
    ///
    /// Progress counts are computed fresh from the member orders on every
    /// call, never stored.
    pub fn list_groups(
        &self,
        status: Option<DeliveryStatus>,
        limit: Option<usize>,
    ) -> AppResult<Vec<DeliverySummary>> {
        let mut deliveries: Vec<Delivery> = self
            .storage
            .list_deliveries()?
            .into_iter()
            .filter(|d| status.is_none_or(|s| d.status == s))
            .collect();
        deliveries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            deliveries.truncate(limit);
        }
        deliveries.into_iter().map(|d| self.summarize(d)).collect()
    }

    /// Delete a dispatch group and release its member orders
    ///
    /// The orders themselves are untouched apart from losing their group
    /// membership.
    pub fn delete_group(&self, delivery_id: u64) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        let delivery = self
            .storage
            .delivery_in_txn(&txn, delivery_id)?
            .ok_or_else(|| AppError::not_found(format!("Delivery {}", delivery_id)))?;

        for &order_id in &delivery.order_ids {
            if let Some(mut order) = self.storage.order_in_txn(&txn, order_id)? {
                order.delivery_id = None;
                self.storage.put_order(&txn, &order)?;
            }
        }
        self.storage.remove_delivery(&txn, delivery_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(delivery_id, "Dispatch group deleted");
        Ok(())
    }

    fn summarize(&self, delivery: Delivery) -> AppResult<DeliverySummary> {
        let mut delivered_count = 0;
        for &order_id in &delivery.order_ids {
            if let Some(order) = self.storage.get_order(order_id)?
                && order.status == OrderStatus::Delivered
            {
                delivered_count += 1;
            }
        }
        Ok(DeliverySummary {
            orders_count: delivery.order_ids.len(),
            delivered_count,
            delivery,
        })
    }
}
