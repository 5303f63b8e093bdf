use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tiffin API",
        version = "0.3.0",
        description = r#"
Backend for a multi-tenant food delivery platform.

- **Ordering**: GST-itemized checkout with coupons, free-delivery thresholds, and wallet payments
- **Lifecycle**: kitchen flow (PENDING → CONFIRMED → COOKING → READY → DELIVERED) and rider dispatch with race-safe claiming
- **Restaurant wallets**: prepaid credit ledger with admin-approved recharges and automatic tech-fee deductions
- **Payments**: hosted-checkout initiation and prefix-routed callbacks
"#,
        contact(name = "Tiffin Labs", email = "engineering@tiffinlabs.in")
    ),
    paths(
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::get_order_by_short_id,
        handlers::orders::advance_order,
        handlers::orders::update_order_status,
        handlers::orders::request_rider,
        handlers::orders::order_notification,
        handlers::riders::available_orders,
        handlers::riders::active_orders,
        handlers::riders::claim_order,
        handlers::riders::pickup_order,
        handlers::riders::deliver_order,
        handlers::riders::set_online,
        handlers::riders::earnings,
        handlers::coupons::create_coupon,
        handlers::coupons::list_coupons,
        handlers::coupons::apply_coupon,
        handlers::coupons::toggle_coupon,
        handlers::coupons::delete_coupon,
        handlers::menu::create_item,
        handlers::menu::list_items,
        handlers::menu::update_stock,
        handlers::menu::toggle_loot,
        handlers::menu::set_availability,
        handlers::wallet::wallet_summary,
        handlers::wallet::list_transactions,
        handlers::wallet::request_recharge,
        handlers::wallet::pending_recharges,
        handlers::wallet::resolve_recharge,
        handlers::restaurants::onboard,
        handlers::restaurants::list_active,
        handlers::restaurants::get_by_slug,
        handlers::restaurants::set_active,
        handlers::payment_webhooks::initiate_payment,
        handlers::payment_webhooks::payment_callback,
    ),
    tags(
        (name = "orders", description = "Checkout and order lifecycle"),
        (name = "riders", description = "Rider dispatch and earnings"),
        (name = "coupons", description = "Restaurant coupon management"),
        (name = "menu", description = "Menu, loot mode, mystery boxes"),
        (name = "wallet", description = "Restaurant credit ledger"),
        (name = "restaurants", description = "Tenant onboarding"),
        (name = "payments", description = "Payment gateway boundary"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
