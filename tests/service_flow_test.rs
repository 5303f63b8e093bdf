//! End-to-end service-layer tests over an in-memory SQLite database:
//! checkout with frozen pricing, the rider-claim race, and the wallet
//! approval guard.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, EntityTrait};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use tiffin_api::config::PricingConfig;
use tiffin_api::db::DbPool;
use tiffin_api::entities::{
    menu_item, order,
    order::{OrderLine, OrderLines, OrderStatus, PaymentMethod, PaymentStatus},
    profile,
    profile::UserRole,
    restaurant,
    wallet_transaction::{self, WalletTransactionStatus, WalletTransactionType},
};
use tiffin_api::errors::ServiceError;
use tiffin_api::migrator::Migrator;
use tiffin_api::services::coupons::{CouponService, CreateCouponRequest};
use tiffin_api::services::orders::{CheckoutItem, CreateOrderRequest, OrderService};
use tiffin_api::services::riders::RiderService;
use tiffin_api::services::wallet::{RechargeDecision, RechargeRequest, WalletService};

async fn test_db() -> Arc<DbPool> {
    // A single connection keeps every query on the same in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("sqlite connects");
    Migrator::up(&db, None).await.expect("migrations apply");
    Arc::new(db)
}

async fn seed_restaurant(db: &DbPool) -> restaurant::Model {
    restaurant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Sharma Tiffins".to_string()),
        slug: Set("sharma-tiffins".to_string()),
        owner_phone: Set("+919812345678".to_string()),
        upi_id: Set("sharma@ybl".to_string()),
        is_active: Set(true),
        tech_fee: Set(dec!(5)),
        delivery_fee: Set(dec!(40)),
        free_delivery_threshold: Set(Some(dec!(300))),
        rating_avg: Set(dec!(0)),
        rating_count: Set(0),
        credit_balance: Set(dec!(100)),
        min_balance_limit: Set(dec!(-200)),
        gst_number: Set(None),
        is_gst_registered: Set(false),
        food_gst_rate: Set(dec!(5)),
        gst_enabled: Set(false),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("restaurant seeds")
}

async fn seed_profile(db: &DbPool, role: UserRole, online: bool) -> profile::Model {
    profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        role: Set(role),
        phone: Set("9876543210".to_string()),
        full_name: Set(Some("Test User".to_string())),
        wallet_balance: Set(dec!(0)),
        is_rider_online: Set(online),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("profile seeds")
}

async fn seed_menu_item(db: &DbPool, restaurant_id: Uuid, price: Decimal) -> menu_item::Model {
    menu_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set("Veg Thali".to_string()),
        category: Set("Meals".to_string()),
        image_url: Set(None),
        base_price: Set(price - dec!(5)),
        selling_price: Set(price),
        is_veg: Set(true),
        is_available: Set(true),
        is_clearance: Set(false),
        stock_remaining: Set(0),
        is_mystery: Set(false),
        mystery_type: Set(None),
        loot_discount_percentage: Set(None),
        promo_description: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("menu item seeds")
}

async fn seed_searching_order(db: &DbPool, restaurant_id: Uuid, customer_id: Uuid) -> order::Model {
    order::ActiveModel {
        id: Set(Uuid::new_v4()),
        short_id: Set(format!("TFN-{}", &Uuid::new_v4().simple().to_string()[..6])),
        restaurant_id: Set(restaurant_id),
        customer_id: Set(customer_id),
        rider_id: Set(None),
        status: Set(OrderStatus::SearchingForRider),
        payment_method: Set(PaymentMethod::CodCash),
        payment_status: Set(PaymentStatus::Pending),
        payment_transaction_id: Set(None),
        items: Set(OrderLines(vec![OrderLine {
            id: Uuid::new_v4(),
            name: "Veg Thali".to_string(),
            price: dec!(105),
            quantity: 1,
            is_mystery: false,
        }])),
        delivery_address: Set("14 MG Road, Indiranagar".to_string()),
        gps_coordinates: Set(None),
        voice_note_url: Set(None),
        coupon_code: Set(None),
        discount_amount: Set(dec!(0)),
        subtotal_before_gst: Set(dec!(105)),
        food_gst_amount: Set(dec!(0)),
        delivery_gst_amount: Set(dec!(0)),
        total_gst_amount: Set(dec!(0)),
        cgst_amount: Set(dec!(0)),
        sgst_amount: Set(dec!(0)),
        total_amount: Set(dec!(145)),
        delivery_fee_charged: Set(dec!(40)),
        net_profit: Set(dec!(15)),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("order seeds")
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn checkout_freezes_pricing_and_deducts_tech_fee() {
    let db = test_db().await;
    let rst = seed_restaurant(&db).await;
    let customer = seed_profile(&db, UserRole::Customer, false).await;
    let item = seed_menu_item(&db, rst.id, dec!(105)).await;

    let coupons = CouponService::new(db.clone());
    coupons
        .create_coupon(CreateCouponRequest {
            restaurant_id: rst.id,
            code: "tasty50".to_string(),
            discount_value: dec!(50),
            min_order_value: dec!(200),
        })
        .await
        .expect("coupon creates");

    let orders = OrderService::new(db.clone(), coupons, PricingConfig::default(), None);

    let response = orders
        .create_order(CreateOrderRequest {
            restaurant_id: rst.id,
            customer_id: customer.id,
            items: vec![CheckoutItem {
                menu_item_id: item.id,
                quantity: 3,
            }],
            payment_method: PaymentMethod::CodCash,
            delivery_address: "14 MG Road, Indiranagar".to_string(),
            gps_coordinates: None,
            voice_note_url: None,
            coupon_code: Some("TASTY50".to_string()),
            use_wallet: false,
        })
        .await
        .expect("order places");

    // 3 x 105 = 315, minus 50 coupon = 265; below the 300 threshold, so the
    // flat ₹40 fee applies. GST disabled for this tenant.
    assert_eq!(response.status, OrderStatus::Pending);
    assert_eq!(response.discount_amount, dec!(50));
    assert_eq!(response.delivery_fee_charged, dec!(40));
    assert_eq!(response.total_amount, dec!(305));

    // Tech fee: 3 units x ₹5 = ₹15, recorded as a signed deduction
    let txns = wallet_transaction::Entity::find()
        .all(&*db)
        .await
        .expect("ledger reads");
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].amount, dec!(-15));
    assert_eq!(txns[0].r#type, WalletTransactionType::FeeDeduction);
    assert_eq!(txns[0].status, WalletTransactionStatus::Approved);

    let rst_after = restaurant::Entity::find_by_id(rst.id)
        .one(&*db)
        .await
        .expect("restaurant reads")
        .expect("restaurant exists");
    assert_eq!(rst_after.credit_balance, dec!(85));
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn coupon_below_minimum_blocks_checkout() {
    let db = test_db().await;
    let rst = seed_restaurant(&db).await;
    let customer = seed_profile(&db, UserRole::Customer, false).await;
    let item = seed_menu_item(&db, rst.id, dec!(105)).await;

    let coupons = CouponService::new(db.clone());
    coupons
        .create_coupon(CreateCouponRequest {
            restaurant_id: rst.id,
            code: "TASTY50".to_string(),
            discount_value: dec!(50),
            min_order_value: dec!(200),
        })
        .await
        .expect("coupon creates");

    let orders = OrderService::new(db.clone(), coupons, PricingConfig::default(), None);

    let err = orders
        .create_order(CreateOrderRequest {
            restaurant_id: rst.id,
            customer_id: customer.id,
            items: vec![CheckoutItem {
                menu_item_id: item.id,
                quantity: 1,
            }],
            payment_method: PaymentMethod::CodCash,
            delivery_address: "14 MG Road, Indiranagar".to_string(),
            gps_coordinates: None,
            voice_note_url: None,
            coupon_code: Some("TASTY50".to_string()),
            use_wallet: false,
        })
        .await
        .expect_err("cart of 105 is under the 200 minimum");

    assert_matches!(err, ServiceError::BelowMinimumOrder(min) if min == dec!(200));
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn rider_claim_is_exclusive() {
    let db = test_db().await;
    let rst = seed_restaurant(&db).await;
    let customer = seed_profile(&db, UserRole::Customer, false).await;
    let order_row = seed_searching_order(&db, rst.id, customer.id).await;

    let mut rider_ids = Vec::new();
    for _ in 0..5 {
        rider_ids.push(seed_profile(&db, UserRole::Rider, true).await.id);
    }

    let riders = RiderService::new(db.clone(), PricingConfig::default(), None);

    let attempts = rider_ids.iter().map(|rider_id| {
        let svc = riders.clone();
        let order_id = order_row.id;
        let rider_id = *rider_id;
        async move { svc.claim_order(order_id, rider_id).await }
    });
    let results = join_all(attempts).await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losses = results
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::OrderUnavailable(_))))
        .count();
    assert_eq!(winners, 1, "exactly one claim must succeed");
    assert_eq!(losses, rider_ids.len() - 1, "every other claim loses the race");

    let claimed = order::Entity::find_by_id(order_row.id)
        .one(&*db)
        .await
        .expect("order reads")
        .expect("order exists");
    assert_eq!(claimed.status, OrderStatus::RiderAssigned);
    assert!(claimed.rider_id.is_some());
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn recharge_resolution_is_single_shot() {
    let db = test_db().await;
    let rst = seed_restaurant(&db).await;
    let admin = seed_profile(&db, UserRole::SuperAdmin, false).await;

    let wallet = WalletService::new(db.clone(), None);
    let txn = wallet
        .request_recharge(RechargeRequest {
            restaurant_id: rst.id,
            amount: dec!(500),
            proof_image_url: None,
            notes: Some("IMPS ref 882211".to_string()),
        })
        .await
        .expect("recharge requests");

    // Requesting alone never touches the balance
    let before = restaurant::Entity::find_by_id(rst.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.credit_balance, dec!(100));

    let resolved = wallet
        .resolve_recharge(txn.id, RechargeDecision::Approve, admin.id)
        .await
        .expect("first resolution succeeds");
    assert_eq!(resolved.status, WalletTransactionStatus::Approved);
    assert_eq!(resolved.approved_by, Some(admin.id));

    let after = restaurant::Entity::find_by_id(rst.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.credit_balance, dec!(600));

    // Second resolution must be rejected and must not credit again
    let err = wallet
        .resolve_recharge(txn.id, RechargeDecision::Approve, admin.id)
        .await
        .expect_err("double resolution is a conflict");
    assert_matches!(err, ServiceError::Conflict(_));

    let unchanged = restaurant::Entity::find_by_id(rst.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.credit_balance, dec!(600));
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn suspension_gates_new_orders_prospectively() {
    let db = test_db().await;
    let rst = seed_restaurant(&db).await;
    let customer = seed_profile(&db, UserRole::Customer, false).await;
    let item = seed_menu_item(&db, rst.id, dec!(105)).await;

    // Push the balance below the floor directly; deductions are always
    // permitted, suspension only blocks future orders.
    let mut active: restaurant::ActiveModel = rst.clone().into();
    active.credit_balance = Set(dec!(-201));
    active.update(&*db).await.expect("balance drops");

    let coupons = CouponService::new(db.clone());
    let orders = OrderService::new(db.clone(), coupons, PricingConfig::default(), None);

    let err = orders
        .create_order(CreateOrderRequest {
            restaurant_id: rst.id,
            customer_id: customer.id,
            items: vec![CheckoutItem {
                menu_item_id: item.id,
                quantity: 1,
            }],
            payment_method: PaymentMethod::CodCash,
            delivery_address: "14 MG Road, Indiranagar".to_string(),
            gps_coordinates: None,
            voice_note_url: None,
            coupon_code: None,
            use_wallet: false,
        })
        .await
        .expect_err("suspended restaurant cannot accept orders");

    assert_matches!(err, ServiceError::RestaurantSuspended(_));
}
