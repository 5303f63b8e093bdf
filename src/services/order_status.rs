use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, EntityTrait, TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::{
        ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel, OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Drives the kitchen-facing half of the order lifecycle. The rider half
/// (claiming, pickup, delivery) lives in the rider service because it needs
/// the compare-and-swap claim path.
#[derive(Clone)]
pub struct OrderStatusService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderStatusService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Moves an order one step along the kitchen chain
    /// (PENDING → CONFIRMED → COOKING → READY → DELIVERED).
    ///
    /// A terminal or rider-side status has no next kitchen step; that is
    /// reported as a conflict so a stale dashboard click cannot silently
    /// rewrite history.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn advance(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        let order = self.fetch(order_id).await?;

        let next = order.status.next_in_kitchen_flow().ok_or_else(|| {
            warn!(status = %order.status, "No next kitchen status");
            ServiceError::Conflict(format!(
                "Order {} in status {} has no next kitchen step",
                order_id, order.status
            ))
        })?;

        self.transition(order, next).await
    }

    /// Applies an explicit status transition after validating it against the
    /// lifecycle chains. Transitions out of DELIVERED are always rejected.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let order = self.fetch(order_id).await?;

        if order.status == new_status {
            // Same-status writes are a no-op, not an error
            return Ok(order);
        }

        if order.status.is_terminal() {
            error!(status = %order.status, "Attempted transition out of a terminal status");
            return Err(ServiceError::Conflict(format!(
                "Order {} is already delivered",
                order_id
            )));
        }

        if !order.status.can_transition(new_status) {
            error!(from = %order.status, to = %new_status, "Illegal status transition");
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot transition from {} to {}",
                order.status, new_status
            )));
        }

        self.transition(order, new_status).await
    }

    /// Hands a READY order to the rider pool
    /// (READY → SEARCHING_FOR_RIDER).
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn request_rider(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        let updated = self
            .update_status(order_id, OrderStatus::SearchingForRider)
            .await?;

        if let Some(sender) = &self.event_sender {
            let _ = sender.send(Event::RiderSearchStarted(order_id)).await;
        }

        Ok(updated)
    }

    async fn fetch(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    async fn transition(
        &self,
        order: OrderModel,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let order_id = order.id;
        let old_status = order.status;

        let txn = self.db.begin().await?;

        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to update order status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await?;

        info!(order_id = %order_id, from = %old_status, to = %new_status, "Order status updated");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status,
                })
                .await;
            if new_status == OrderStatus::Delivered {
                let _ = sender.send(Event::OrderDelivered(order_id)).await;
            }
        }

        Ok(updated)
    }
}
