use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tenant record. The credit balance is a signed prepaid ledger: it may run
/// negative down to `min_balance_limit`, below which order acceptance is
/// suspended (checked prospectively, never retroactively).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Restaurant)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub owner_phone: String,
    pub upi_id: String,
    pub is_active: bool,
    /// Flat per-item platform commission, folded into selling prices
    pub tech_fee: Decimal,
    pub delivery_fee: Decimal,
    /// Orders at or above this post-discount subtotal ship free
    pub free_delivery_threshold: Option<Decimal>,
    pub rating_avg: Decimal,
    pub rating_count: i32,
    pub credit_balance: Decimal,
    /// Floor for the credit balance, typically negative
    pub min_balance_limit: Decimal,
    pub gst_number: Option<String>,
    pub is_gst_registered: bool,
    pub food_gst_rate: Decimal,
    pub gst_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Order-acceptance gate: suspended tenants keep serving reads, but no
    /// new orders are created against them.
    pub fn can_accept_orders(&self) -> bool {
        self.credit_balance >= self.min_balance_limit
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::menu_item::Entity")]
    MenuItems,
    #[sea_orm(has_many = "super::coupon::Entity")]
    Coupons,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    #[sea_orm(has_many = "super::wallet_transaction::Entity")]
    WalletTransactions,
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupons.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::wallet_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn restaurant(balance: Decimal, floor: Decimal) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Apna Dhaba".to_string(),
            slug: "apna-dhaba".to_string(),
            owner_phone: "+919876543210".to_string(),
            upi_id: "apnadhaba@ybl".to_string(),
            is_active: true,
            tech_fee: dec!(5),
            delivery_fee: dec!(40),
            free_delivery_threshold: None,
            rating_avg: dec!(0),
            rating_count: 0,
            credit_balance: balance,
            min_balance_limit: floor,
            gst_number: None,
            is_gst_registered: false,
            food_gst_rate: dec!(5),
            gst_enabled: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn balance_gate_allows_negative_down_to_floor() {
        assert!(restaurant(dec!(-199), dec!(-200)).can_accept_orders());
        assert!(restaurant(dec!(-200), dec!(-200)).can_accept_orders());
        assert!(!restaurant(dec!(-201), dec!(-200)).can_accept_orders());
    }
}
