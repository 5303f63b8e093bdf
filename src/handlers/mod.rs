pub mod coupons;
pub mod menu;
pub mod orders;
pub mod payment_webhooks;
pub mod restaurants;
pub mod riders;
pub mod wallet;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub restaurants: Arc<crate::services::restaurants::RestaurantService>,
    pub menu: Arc<crate::services::menu::MenuService>,
    pub coupons: Arc<crate::services::coupons::CouponService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub order_status: Arc<crate::services::order_status::OrderStatusService>,
    pub riders: Arc<crate::services::riders::RiderService>,
    pub wallet: Arc<crate::services::wallet::WalletService>,
    pub payments: Arc<crate::services::payments::PaymentService>,
}

impl AppServices {
    /// Wires every service onto the shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let coupons = crate::services::coupons::CouponService::new(db_pool.clone());

        let orders = crate::services::orders::OrderService::new(
            db_pool.clone(),
            coupons.clone(),
            config.pricing.clone(),
            Some(event_sender.clone()),
        );

        let order_status = crate::services::order_status::OrderStatusService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        );

        let riders = crate::services::riders::RiderService::new(
            db_pool.clone(),
            config.pricing.clone(),
            Some(event_sender.clone()),
        );

        let wallet = crate::services::wallet::WalletService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        );

        let payments = crate::services::payments::PaymentService::new(
            db_pool.clone(),
            config.payment.clone(),
            Some(event_sender.clone()),
        );

        let restaurants = crate::services::restaurants::RestaurantService::new(
            db_pool.clone(),
            config.pricing.food_gst_rate,
        );

        let menu = crate::services::menu::MenuService::new(db_pool);

        Self {
            restaurants: Arc::new(restaurants),
            menu: Arc::new(menu),
            coupons: Arc::new(coupons),
            orders: Arc::new(orders),
            order_status: Arc::new(order_status),
            riders: Arc::new(riders),
            wallet: Arc::new(wallet),
            payments: Arc::new(payments),
        }
    }
}
