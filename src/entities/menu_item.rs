use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MysteryType {
    #[sea_orm(string_value = "VEG")]
    Veg,
    #[sea_orm(string_value = "NON_VEG")]
    NonVeg,
    #[sea_orm(string_value = "ANY")]
    Any,
}

/// Sellable unit, including flash-sale ("loot") and mystery-box variants.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = MenuItem)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub base_price: Decimal,
    /// base_price + the restaurant's tech fee, fixed at creation time
    pub selling_price: Decimal,
    pub is_veg: bool,
    pub is_available: bool,
    /// Flash-sale flag; requires stock_remaining > 0 to enable
    pub is_clearance: bool,
    pub stock_remaining: i32,
    pub is_mystery: bool,
    pub mystery_type: Option<MysteryType>,
    /// Overrides the derived clearance discount when set
    pub loot_discount_percentage: Option<Decimal>,
    pub promo_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Effective flash-sale discount percentage: the explicit override when
    /// present, otherwise derived from the gap between base and selling
    /// price. Enabling loot mode never changes the price itself.
    pub fn effective_loot_discount(&self) -> Decimal {
        if let Some(pct) = self.loot_discount_percentage {
            return pct;
        }
        if self.base_price.is_zero() {
            return Decimal::ZERO;
        }
        (self.base_price - self.selling_price) / self.base_price * Decimal::ONE_HUNDRED
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(base: Decimal, selling: Decimal, over: Option<Decimal>) -> Model {
        Model {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            name: "Paneer Tikka".to_string(),
            category: "Starters".to_string(),
            image_url: None,
            base_price: base,
            selling_price: selling,
            is_veg: true,
            is_available: true,
            is_clearance: false,
            stock_remaining: 0,
            is_mystery: false,
            mystery_type: None,
            loot_discount_percentage: over,
            promo_description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn loot_discount_prefers_override() {
        assert_eq!(
            item(dec!(200), dec!(150), Some(dec!(40))).effective_loot_discount(),
            dec!(40)
        );
    }

    #[test]
    fn loot_discount_derives_from_price_gap() {
        assert_eq!(
            item(dec!(200), dec!(150), None).effective_loot_discount(),
            dec!(25)
        );
    }
}
