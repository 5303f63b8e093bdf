use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Order status spanning both the kitchen-facing flow and the rider-dispatch
/// flow. Each flow is a strict linear chain; DELIVERED terminates both.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "COOKING")]
    Cooking,
    #[sea_orm(string_value = "READY")]
    Ready,
    #[sea_orm(string_value = "SEARCHING_FOR_RIDER")]
    SearchingForRider,
    #[sea_orm(string_value = "RIDER_ASSIGNED")]
    RiderAssigned,
    #[sea_orm(string_value = "OUT_FOR_DELIVERY")]
    OutForDelivery,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cooking => "COOKING",
            Self::Ready => "READY",
            Self::SearchingForRider => "SEARCHING_FOR_RIDER",
            Self::RiderAssigned => "RIDER_ASSIGNED",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
        }
    }

    /// Next step in the kitchen flow. `None` from a terminal or rider-side
    /// state is a no-op signal for the caller, not an error.
    pub fn next_in_kitchen_flow(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Cooking),
            Self::Cooking => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Next step in the rider-dispatch flow.
    pub fn next_in_rider_flow(&self) -> Option<OrderStatus> {
        match self {
            Self::SearchingForRider => Some(Self::RiderAssigned),
            Self::RiderAssigned => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Legal transitions. One step forward per flow, with READY allowed to
    /// branch into rider dispatch; no skips, no rollback.
    pub fn can_transition(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Confirmed, Cooking)
                | (Cooking, Ready)
                | (Ready, Delivered)
                | (Ready, SearchingForRider)
                | (SearchingForRider, RiderAssigned)
                | (RiderAssigned, OutForDelivery)
                | (OutForDelivery, Delivered)
        )
    }

    /// Display mapping for dashboards: unrecognized raw values render as
    /// PENDING so stale rows still show up. Store-boundary parsing uses
    /// `FromStr` and rejects unknown values instead.
    pub fn parse_lenient(raw: &str) -> OrderStatus {
        OrderStatus::from_str(raw).unwrap_or(OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::errors::ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "COOKING" => Ok(Self::Cooking),
            "READY" => Ok(Self::Ready),
            "SEARCHING_FOR_RIDER" => Ok(Self::SearchingForRider),
            "RIDER_ASSIGNED" => Ok(Self::RiderAssigned),
            "OUT_FOR_DELIVERY" => Ok(Self::OutForDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            other => Err(crate::errors::ServiceError::InvalidStatus(format!(
                "Unknown order status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "PREPAID_UPI")]
    PrepaidUpi,
    #[sea_orm(string_value = "COD_CASH")]
    CodCash,
    #[sea_orm(string_value = "COD_UPI_SCAN")]
    CodUpiScan,
}

impl PaymentMethod {
    /// Prepaid orders reach the restaurant with money already collected.
    pub fn is_prepaid(&self) -> bool {
        matches!(self, Self::PrepaidUpi)
    }
}

/// Written only by the payment-gateway callback; independent of the order
/// lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

/// One purchased line, denormalized onto the order at checkout so later menu
/// edits never rewrite history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct OrderLine {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub is_mystery: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct OrderLines(pub Vec<OrderLine>);

impl OrderLines {
    pub fn total_quantity(&self) -> u32 {
        self.0.iter().map(|line| line.quantity).sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.0
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }
}

/// A customer purchase. All monetary fields are computed and frozen at
/// creation time; rows are append-only for the finance audit trail.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Order)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-readable code shown to customers and restaurants
    pub short_id: String,
    pub restaurant_id: Uuid,
    pub customer_id: Uuid,
    pub rider_id: Option<Uuid>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_transaction_id: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub items: OrderLines,
    pub delivery_address: String,
    pub gps_coordinates: Option<String>,
    pub voice_note_url: Option<String>,
    pub coupon_code: Option<String>,
    pub discount_amount: Decimal,
    pub subtotal_before_gst: Decimal,
    pub food_gst_amount: Decimal,
    pub delivery_gst_amount: Decimal,
    pub total_gst_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub total_amount: Decimal,
    pub delivery_fee_charged: Decimal,
    pub net_profit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::CustomerId",
        to = "super::profile::Column::Id"
    )]
    Customer,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(OrderStatus::Pending, Some(OrderStatus::Confirmed))]
    #[case(OrderStatus::Confirmed, Some(OrderStatus::Cooking))]
    #[case(OrderStatus::Cooking, Some(OrderStatus::Ready))]
    #[case(OrderStatus::Ready, Some(OrderStatus::Delivered))]
    #[case(OrderStatus::Delivered, None)]
    #[case(OrderStatus::RiderAssigned, None)]
    fn kitchen_flow_is_a_strict_chain(
        #[case] from: OrderStatus,
        #[case] expected: Option<OrderStatus>,
    ) {
        assert_eq!(from.next_in_kitchen_flow(), expected);
    }

    #[rstest]
    #[case(OrderStatus::SearchingForRider, Some(OrderStatus::RiderAssigned))]
    #[case(OrderStatus::RiderAssigned, Some(OrderStatus::OutForDelivery))]
    #[case(OrderStatus::OutForDelivery, Some(OrderStatus::Delivered))]
    #[case(OrderStatus::Delivered, None)]
    #[case(OrderStatus::Cooking, None)]
    fn rider_flow_is_a_strict_chain(
        #[case] from: OrderStatus,
        #[case] expected: Option<OrderStatus>,
    ) {
        assert_eq!(from.next_in_rider_flow(), expected);
    }

    #[test]
    fn no_transition_skips_or_reverses() {
        assert!(!OrderStatus::Pending.can_transition(OrderStatus::Cooking));
        assert!(!OrderStatus::Cooking.can_transition(OrderStatus::Confirmed));
        assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Pending));
        assert!(OrderStatus::Ready.can_transition(OrderStatus::SearchingForRider));
    }

    #[test]
    fn lenient_parse_defaults_to_pending_for_display_only() {
        assert_eq!(OrderStatus::parse_lenient("DELIVERED"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::parse_lenient("garbage"), OrderStatus::Pending);
        assert!(OrderStatus::from_str("garbage").is_err());
    }

    #[test]
    fn order_lines_aggregate_quantity_and_subtotal() {
        let lines = OrderLines(vec![
            OrderLine {
                id: Uuid::new_v4(),
                name: "Veg Thali".to_string(),
                price: dec!(120),
                quantity: 2,
                is_mystery: false,
            },
            OrderLine {
                id: Uuid::new_v4(),
                name: "Mystery Box".to_string(),
                price: dec!(99),
                quantity: 1,
                is_mystery: true,
            },
        ]);
        assert_eq!(lines.total_quantity(), 3);
        assert_eq!(lines.subtotal(), dec!(339));
    }
}
