use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::PricingConfig,
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
    entities::profile::{self, Entity as ProfileEntity, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RiderEarnings {
    pub rider_id: Uuid,
    pub deliveries: u64,
    pub total_earnings: Decimal,
    pub since: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RiderService {
    db: Arc<DbPool>,
    pricing: PricingConfig,
    event_sender: Option<Arc<EventSender>>,
}

impl RiderService {
    pub fn new(
        db: Arc<DbPool>,
        pricing: PricingConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            pricing,
            event_sender,
        }
    }

    /// Orders waiting for a rider, oldest first so the queue is fair.
    #[instrument(skip(self))]
    pub async fn list_available_orders(&self) -> Result<Vec<OrderModel>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(order::Column::Status.eq(OrderStatus::SearchingForRider))
            .filter(order::Column::RiderId.is_null())
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(orders)
    }

    /// Orders the rider is currently carrying.
    #[instrument(skip(self), fields(rider_id = %rider_id))]
    pub async fn list_active_orders(&self, rider_id: Uuid) -> Result<Vec<OrderModel>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(order::Column::RiderId.eq(rider_id))
            .filter(
                order::Column::Status
                    .is_in([OrderStatus::RiderAssigned, OrderStatus::OutForDelivery]),
            )
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(orders)
    }

    /// Claims an order for a rider.
    ///
    /// The claim is a compare-and-swap: the write is conditioned on the order
    /// still being SEARCHING_FOR_RIDER with no rider set, evaluated
    /// atomically by the store. Zero rows affected means another rider won
    /// the race; the caller gets "no longer available" and should re-list,
    /// this is not a fault.
    #[instrument(skip(self), fields(order_id = %order_id, rider_id = %rider_id))]
    pub async fn claim_order(
        &self,
        order_id: Uuid,
        rider_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        self.ensure_online_rider(rider_id).await?;

        let result = OrderEntity::update_many()
            .col_expr(order::Column::RiderId, Expr::value(Some(rider_id)))
            .col_expr(
                order::Column::Status,
                Expr::value(OrderStatus::RiderAssigned),
            )
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(OrderStatus::SearchingForRider))
            .filter(order::Column::RiderId.is_null())
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            warn!("Claim lost the race");
            return Err(ServiceError::OrderUnavailable(order_id));
        }

        info!("Order claimed");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::RiderAssigned { order_id, rider_id })
                .await;
        }

        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        Ok(order)
    }

    /// Marks an assigned order as picked up
    /// (RIDER_ASSIGNED → OUT_FOR_DELIVERY). Only the assigned rider may do
    /// this.
    #[instrument(skip(self), fields(order_id = %order_id, rider_id = %rider_id))]
    pub async fn pickup_order(
        &self,
        order_id: Uuid,
        rider_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        self.rider_transition(order_id, rider_id, OrderStatus::OutForDelivery)
            .await
    }

    /// Completes a delivery (OUT_FOR_DELIVERY → DELIVERED). Only the
    /// assigned rider may do this; DELIVERED terminates both flows.
    #[instrument(skip(self), fields(order_id = %order_id, rider_id = %rider_id))]
    pub async fn complete_delivery(
        &self,
        order_id: Uuid,
        rider_id: Uuid,
    ) -> Result<OrderModel, ServiceError> {
        let order = self
            .rider_transition(order_id, rider_id, OrderStatus::Delivered)
            .await?;

        if let Some(sender) = &self.event_sender {
            let _ = sender.send(Event::OrderDelivered(order_id)).await;
        }

        Ok(order)
    }

    /// Toggles the rider's availability for dispatch.
    #[instrument(skip(self), fields(rider_id = %rider_id, online = online))]
    pub async fn set_online(&self, rider_id: Uuid, online: bool) -> Result<(), ServiceError> {
        let rider = self.fetch_rider(rider_id).await?;

        let mut active: profile::ActiveModel = rider.into();
        active.is_rider_online = Set(online);
        active.update(&*self.db).await?;

        info!("Rider availability updated");
        Ok(())
    }

    /// Deliveries completed in the window and the flat payout owed for them.
    #[instrument(skip(self), fields(rider_id = %rider_id))]
    pub async fn earnings(
        &self,
        rider_id: Uuid,
        window_days: i64,
    ) -> Result<RiderEarnings, ServiceError> {
        self.fetch_rider(rider_id).await?;

        let since = Utc::now() - Duration::days(window_days);
        let deliveries = OrderEntity::find()
            .filter(order::Column::RiderId.eq(rider_id))
            .filter(order::Column::Status.eq(OrderStatus::Delivered))
            .filter(order::Column::UpdatedAt.gte(since))
            .count(&*self.db)
            .await?;

        Ok(RiderEarnings {
            rider_id,
            deliveries,
            total_earnings: self.pricing.rider_flat_payout * Decimal::from(deliveries),
            since,
        })
    }

    async fn rider_transition(
        &self,
        order_id: Uuid,
        rider_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if order.rider_id != Some(rider_id) {
            return Err(ServiceError::Forbidden(
                "Order is assigned to a different rider".to_string(),
            ));
        }

        if !order.status.can_transition(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot transition from {} to {}",
                order.status, new_status
            )));
        }

        let old_status = order.status;
        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await?;

        info!(from = %old_status, to = %new_status, "Rider moved order forward");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status,
                })
                .await;
        }

        Ok(updated)
    }

    async fn fetch_rider(&self, rider_id: Uuid) -> Result<profile::Model, ServiceError> {
        let rider = ProfileEntity::find_by_id(rider_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Rider {} not found", rider_id)))?;

        if rider.role != UserRole::Rider {
            return Err(ServiceError::Forbidden(
                "Profile is not registered as a rider".to_string(),
            ));
        }

        Ok(rider)
    }

    async fn ensure_online_rider(&self, rider_id: Uuid) -> Result<(), ServiceError> {
        let rider = self.fetch_rider(rider_id).await?;
        if !rider.is_rider_online {
            return Err(ServiceError::InvalidOperation(
                "Go online before accepting deliveries".to_string(),
            ));
        }
        Ok(())
    }
}
