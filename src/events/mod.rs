use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::entities::order::OrderStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The events that can occur in the system. Consumed in-process today; the
// enum is serializable so a broker can take over without touching emitters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderDelivered(Uuid),

    // Rider dispatch events
    RiderSearchStarted(Uuid),
    RiderAssigned {
        order_id: Uuid,
        rider_id: Uuid,
    },

    // Restaurant credit ledger events
    FeeDeducted {
        restaurant_id: Uuid,
        amount: Decimal,
        order_id: Uuid,
    },
    RechargeRequested {
        transaction_id: Uuid,
        restaurant_id: Uuid,
        amount: Decimal,
    },
    RechargeResolved {
        transaction_id: Uuid,
        approved: bool,
        resolved_at: DateTime<Utc>,
    },

    // Payment gateway events
    PaymentCompleted {
        transaction_id: String,
        amount: Decimal,
    },
    PaymentFailed {
        transaction_id: String,
    },
}

/// Drains the event channel. Today this logs and feeds the notification
/// templates; delivery of restaurant notifications stays manual (the owner
/// clicks the generated link), so nothing here retries or blocks.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "order placed");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(order_id = %order_id, from = %old_status, to = %new_status, "order status changed");
            }
            Event::OrderDelivered(order_id) => {
                info!(order_id = %order_id, "order delivered");
            }
            Event::RiderSearchStarted(order_id) => {
                info!(order_id = %order_id, "searching for rider");
            }
            Event::RiderAssigned { order_id, rider_id } => {
                info!(order_id = %order_id, rider_id = %rider_id, "rider assigned");
            }
            Event::FeeDeducted {
                restaurant_id,
                amount,
                order_id,
            } => {
                info!(restaurant_id = %restaurant_id, amount = %amount, order_id = %order_id, "tech fee deducted");
            }
            Event::RechargeRequested {
                transaction_id,
                restaurant_id,
                amount,
            } => {
                info!(transaction_id = %transaction_id, restaurant_id = %restaurant_id, amount = %amount, "recharge requested");
            }
            Event::RechargeResolved {
                transaction_id,
                approved,
                ..
            } => {
                info!(transaction_id = %transaction_id, approved = approved, "recharge resolved");
            }
            Event::PaymentCompleted {
                transaction_id,
                amount,
            } => {
                info!(transaction_id = %transaction_id, amount = %amount, "payment completed");
            }
            Event::PaymentFailed { transaction_id } => {
                error!(transaction_id = %transaction_id, "payment failed");
            }
        }
    }

    info!("Event channel closed; processing loop exiting");
}
