use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::PricingConfig,
    db::DbPool,
    entities::menu_item::{self, Entity as MenuItemEntity},
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderLine, OrderLines, OrderStatus, PaymentMethod, PaymentStatus,
    },
    entities::profile::{self, Entity as ProfileEntity},
    entities::restaurant::{self, Entity as RestaurantEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    notifications,
    services::coupons::CouponService,
    services::pricing::{self, BillBreakdown, GstConfig},
    services::wallet,
};

/// One cart line as submitted by the client. Prices are never taken from the
/// client; they are resolved from the menu at checkout time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub menu_item_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Cart cannot be empty"))]
    pub items: Vec<CheckoutItem>,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 10, max = 500, message = "Delivery address is required"))]
    pub delivery_address: String,
    pub gps_coordinates: Option<String>,
    pub voice_note_url: Option<String>,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub use_wallet: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub short_id: String,
    pub restaurant_id: Uuid,
    pub customer_id: Uuid,
    pub rider_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderLine>,
    pub delivery_address: String,
    pub gps_coordinates: Option<String>,
    pub voice_note_url: Option<String>,
    pub coupon_code: Option<String>,
    pub discount_amount: Decimal,
    pub bill: BillBreakdown,
    pub total_amount: Decimal,
    pub delivery_fee_charged: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Filters for order listings
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderFilter {
    pub restaurant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// Owner-facing notification payload for one order
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderNotification {
    pub order_id: Uuid,
    pub message: String,
    pub whatsapp_link: String,
    pub upi_link: String,
    pub maps_link: Option<String>,
}

const SHORT_ID_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Human-readable order code, e.g. `TFN-7KQ2MX`. Ambiguous glyphs (0/O, 1/I/L)
/// are excluded from the alphabet.
fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..6)
        .map(|_| SHORT_ID_ALPHABET[rng.gen_range(0..SHORT_ID_ALPHABET.len())] as char)
        .collect();
    format!("TFN-{code}")
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    coupons: CouponService,
    pricing: PricingConfig,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        coupons: CouponService,
        pricing: PricingConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            coupons,
            pricing,
            event_sender,
        }
    }

    /// Places an order: applies the coupon, prices the cart, freezes the GST
    /// breakdown and net profit onto the row, and records the tech-fee
    /// deduction against the restaurant wallet — all in one transaction.
    ///
    /// Monetary fields are never recomputed after this point.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let db = &*self.db;

        let rst = RestaurantEntity::find_by_id(request.restaurant_id)
            .one(db)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant {} not found", request.restaurant_id))
            })?;

        // Suspension is checked before anything is written; an order that
        // pushes the balance below the floor still completes (see wallet).
        if !rst.can_accept_orders() {
            warn!(credit_balance = %rst.credit_balance, "Restaurant below minimum balance");
            return Err(ServiceError::RestaurantSuspended(rst.id));
        }

        let customer = ProfileEntity::find_by_id(request.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", request.customer_id))
            })?;

        let lines = self.resolve_cart(&rst, &request.items).await?;
        let cart_subtotal = lines.subtotal();

        let (coupon_code, discount) = match &request.coupon_code {
            Some(code) => {
                let applied = self
                    .coupons
                    .apply_coupon(rst.id, code, cart_subtotal)
                    .await?;
                (Some(applied.code), applied.discount)
            }
            None => (None, Decimal::ZERO),
        };

        let delivery_fee = pricing::compute_delivery_fee(&rst, cart_subtotal - discount);

        let gst_config = GstConfig::for_restaurant(&self.pricing, &rst);
        let bill = pricing::compute_bill(
            cart_subtotal,
            delivery_fee,
            discount,
            customer.wallet_balance,
            request.use_wallet,
            &gst_config,
        );

        let net_profit = pricing::compute_net_profit(
            rst.tech_fee,
            lines.total_quantity(),
            delivery_fee,
            self.pricing.delivery_rider_cost,
        );
        let tech_fee_total = rst.tech_fee * Decimal::from(lines.total_quantity());

        let order_id = Uuid::new_v4();
        let short_id = generate_short_id();
        let now = Utc::now();

        let txn = db.begin().await?;

        let order_model = OrderActiveModel {
            id: Set(order_id),
            short_id: Set(short_id.clone()),
            restaurant_id: Set(rst.id),
            customer_id: Set(customer.id),
            rider_id: Set(None),
            status: Set(OrderStatus::Pending),
            payment_method: Set(request.payment_method),
            payment_status: Set(PaymentStatus::Pending),
            payment_transaction_id: Set(None),
            items: Set(lines.clone()),
            delivery_address: Set(request.delivery_address.clone()),
            gps_coordinates: Set(request.gps_coordinates.clone()),
            voice_note_url: Set(request.voice_note_url.clone()),
            coupon_code: Set(coupon_code),
            discount_amount: Set(bill.discount_amount),
            subtotal_before_gst: Set(bill.subtotal_before_gst),
            food_gst_amount: Set(bill.food_gst_amount),
            delivery_gst_amount: Set(bill.delivery_gst_amount),
            total_gst_amount: Set(bill.total_gst_amount),
            cgst_amount: Set(bill.cgst_amount),
            sgst_amount: Set(bill.sgst_amount),
            total_amount: Set(bill.grand_total),
            delivery_fee_charged: Set(bill.delivery_fee_after_gst),
            net_profit: Set(net_profit),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let inserted = order_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        wallet::record_fee_deduction(
            &txn,
            rst.id,
            tech_fee_total,
            Some(format!("Tech fee for order {short_id}")),
        )
        .await?;

        if bill.wallet_deduction > Decimal::ZERO {
            let mut customer_active: profile::ActiveModel = customer.clone().into();
            customer_active.wallet_balance =
                Set(customer.wallet_balance - bill.wallet_deduction);
            customer_active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(order_id = %order_id, short_id = %short_id, total = %bill.grand_total, "Order placed");

        if let Some(sender) = &self.event_sender {
            let _ = sender.send(Event::OrderCreated(order_id)).await;
            let _ = sender
                .send(Event::FeeDeducted {
                    restaurant_id: rst.id,
                    amount: tech_fee_total,
                    order_id,
                })
                .await;
        }

        // The stored row has no wallet-deduction column; the response for
        // the freshly placed order carries the bill as computed.
        let mut response = self.model_to_response(inserted);
        response.bill = bill;
        Ok(response)
    }

    /// Resolves client cart lines against the live menu, rejecting anything
    /// unavailable or foreign to the restaurant.
    async fn resolve_cart(
        &self,
        rst: &restaurant::Model,
        items: &[CheckoutItem],
    ) -> Result<OrderLines, ServiceError> {
        let ids: Vec<Uuid> = items.iter().map(|i| i.menu_item_id).collect();
        let menu_items: HashMap<Uuid, menu_item::Model> = MenuItemEntity::find()
            .filter(menu_item::Column::RestaurantId.eq(rst.id))
            .filter(menu_item::Column::Id.is_in(ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let menu = menu_items.get(&item.menu_item_id).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Menu item {} does not belong to this restaurant",
                    item.menu_item_id
                ))
            })?;
            if !menu.is_available {
                return Err(ServiceError::ValidationError(format!(
                    "{} is currently unavailable",
                    menu.name
                )));
            }
            if item.quantity == 0 {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for {} must be at least 1",
                    menu.name
                )));
            }
            if menu.is_clearance && menu.stock_remaining < item.quantity as i32 {
                return Err(ServiceError::InsufficientStock(format!(
                    "Only {} of {} left",
                    menu.stock_remaining, menu.name
                )));
            }
            lines.push(OrderLine {
                id: menu.id,
                name: menu.name.clone(),
                price: menu.selling_price,
                quantity: item.quantity,
                is_mystery: menu.is_mystery,
            });
        }
        Ok(OrderLines(lines))
    }

    /// Retrieves an order by id.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        Ok(self.model_to_response(order))
    }

    /// Retrieves an order by its human-readable short code.
    #[instrument(skip(self), fields(short_id = %short_id))]
    pub async fn get_order_by_short_id(
        &self,
        short_id: &str,
    ) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find()
            .filter(order::Column::ShortId.eq(short_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", short_id)))?;

        Ok(self.model_to_response(order))
    }

    /// Lists orders with filters and pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let mut query = OrderEntity::find();
        if let Some(restaurant_id) = filter.restaurant_id {
            query = query.filter(order::Column::RestaurantId.eq(restaurant_id));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let responses: Vec<OrderResponse> = orders
            .into_iter()
            .map(|order| self.model_to_response(order))
            .collect();

        Ok(OrderListResponse {
            orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// Builds the owner-facing notification payload for an order: the
    /// WhatsApp summary with its `wa.me` link, plus the UPI collection link.
    /// Delivery is manual; the owner clicks the link.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn notification_links(
        &self,
        order_id: Uuid,
    ) -> Result<OrderNotification, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let rst = RestaurantEntity::find_by_id(order.restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant {} not found", order.restaurant_id))
            })?;

        let customer = ProfileEntity::find_by_id(order.customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", order.customer_id))
            })?;

        let customer_name = customer.full_name.unwrap_or_else(|| "Customer".to_string());
        let customer_phone = notifications::format_phone_number(&customer.phone);

        let message =
            notifications::whatsapp_order_message(&order, &customer_name, &customer_phone);
        let whatsapp_link = notifications::whatsapp_link(&rst.owner_phone, &message);
        let upi_link = notifications::upi_deep_link(
            &rst.upi_id,
            &rst.name,
            order.total_amount,
            &order.short_id,
        );
        let maps_link = order
            .gps_coordinates
            .as_deref()
            .map(notifications::google_maps_link);

        Ok(OrderNotification {
            order_id,
            message,
            whatsapp_link,
            upi_link,
            maps_link,
        })
    }

    /// Rebuilds the response view of an order. The bill section echoes the
    /// frozen fields; nothing is recomputed.
    fn model_to_response(&self, model: OrderModel) -> OrderResponse {
        let bill = BillBreakdown {
            subtotal_before_gst: model.subtotal_before_gst,
            delivery_fee_before_gst: model.delivery_fee_charged - model.delivery_gst_amount,
            food_gst_amount: model.food_gst_amount,
            delivery_gst_amount: model.delivery_gst_amount,
            total_gst_amount: model.total_gst_amount,
            cgst_amount: model.cgst_amount,
            sgst_amount: model.sgst_amount,
            subtotal_after_gst: model.subtotal_before_gst + model.food_gst_amount,
            delivery_fee_after_gst: model.delivery_fee_charged,
            grand_total: model.total_amount,
            discount_amount: model.discount_amount,
            wallet_deduction: Decimal::ZERO,
            amount_to_pay: model.total_amount,
        };

        OrderResponse {
            id: model.id,
            short_id: model.short_id,
            restaurant_id: model.restaurant_id,
            customer_id: model.customer_id,
            rider_id: model.rider_id,
            status: model.status,
            payment_method: model.payment_method,
            payment_status: model.payment_status,
            items: model.items.0,
            delivery_address: model.delivery_address,
            gps_coordinates: model.gps_coordinates,
            voice_note_url: model.voice_note_url,
            coupon_code: model.coupon_code,
            discount_amount: model.discount_amount,
            bill,
            total_amount: model.total_amount,
            delivery_fee_charged: model.delivery_fee_charged,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
