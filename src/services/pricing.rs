//! Order pricing: GST decomposition, delivery-fee policy, and net-profit
//! attribution.
//!
//! Indian restaurant GST at launch rates: food 5% (CGST 2.5% + SGST 2.5%),
//! delivery and platform charges 18% (CGST 9% + SGST 9%). Listed prices are
//! GST-inclusive by default, so the tax is backed out of the amount rather
//! than added on top.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::PricingConfig;
use crate::entities::restaurant;

/// GST rates and the inclusive/exclusive switch for one bill computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GstConfig {
    pub food_gst_rate: Decimal,
    pub delivery_gst_rate: Decimal,
    pub platform_gst_rate: Decimal,
    pub gst_inclusive: bool,
}

impl GstConfig {
    pub fn from_pricing(pricing: &PricingConfig) -> Self {
        Self {
            food_gst_rate: pricing.food_gst_rate,
            delivery_gst_rate: pricing.delivery_gst_rate,
            platform_gst_rate: pricing.platform_gst_rate,
            gst_inclusive: pricing.gst_inclusive,
        }
    }

    /// Rates for a specific tenant. A restaurant that has GST disabled gets
    /// zero rates: the whole listed amount is treated as the base.
    pub fn for_restaurant(pricing: &PricingConfig, rst: &restaurant::Model) -> Self {
        if rst.gst_enabled {
            Self {
                food_gst_rate: rst.food_gst_rate,
                ..Self::from_pricing(pricing)
            }
        } else {
            Self {
                food_gst_rate: Decimal::ZERO,
                delivery_gst_rate: Decimal::ZERO,
                platform_gst_rate: Decimal::ZERO,
                gst_inclusive: pricing.gst_inclusive,
            }
        }
    }
}

/// Fully itemized bill. Every field is rounded to 2 decimal places
/// independently; consumers must not re-derive one field from the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BillBreakdown {
    pub subtotal_before_gst: Decimal,
    pub delivery_fee_before_gst: Decimal,

    pub food_gst_amount: Decimal,
    pub delivery_gst_amount: Decimal,
    pub total_gst_amount: Decimal,

    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,

    pub subtotal_after_gst: Decimal,
    pub delivery_fee_after_gst: Decimal,
    pub grand_total: Decimal,

    pub discount_amount: Decimal,
    pub wallet_deduction: Decimal,
    pub amount_to_pay: Decimal,
}

/// Round half away from zero to 2 decimal places, matching how every stored
/// monetary figure is presented.
fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn pct(rate: Decimal) -> Decimal {
    rate / Decimal::ONE_HUNDRED
}

/// Converts a cart total, delivery fee, discount, and wallet usage into the
/// itemized bill.
///
/// Inclusive mode backs the pre-tax base out via `amount / (1 + rate/100)`;
/// exclusive mode computes tax forward as `amount * rate/100`. CGST and SGST
/// are always exact halves of the total GST (intra-state split). The grand
/// total never adds tax again: in inclusive mode it is already embedded in
/// the listed amounts.
///
/// A negative discount flows through unchecked.
pub fn compute_bill(
    cart_total: Decimal,
    delivery_fee: Decimal,
    discount_amount: Decimal,
    wallet_balance: Decimal,
    use_wallet: bool,
    config: &GstConfig,
) -> BillBreakdown {
    let (subtotal_before_gst, food_gst_amount, delivery_fee_before_gst, delivery_gst_amount) =
        if config.gst_inclusive {
            let subtotal_before = cart_total / (Decimal::ONE + pct(config.food_gst_rate));
            let delivery_before = delivery_fee / (Decimal::ONE + pct(config.delivery_gst_rate));
            (
                subtotal_before,
                cart_total - subtotal_before,
                delivery_before,
                delivery_fee - delivery_before,
            )
        } else {
            (
                cart_total,
                cart_total * pct(config.food_gst_rate),
                delivery_fee,
                delivery_fee * pct(config.delivery_gst_rate),
            )
        };

    let total_gst_amount = food_gst_amount + delivery_gst_amount;
    let half_gst = total_gst_amount / Decimal::TWO;

    let grand_total = cart_total + delivery_fee - discount_amount;

    let wallet_deduction = if use_wallet {
        wallet_balance.min(grand_total)
    } else {
        Decimal::ZERO
    };
    let amount_to_pay = grand_total - wallet_deduction;

    BillBreakdown {
        subtotal_before_gst: round2(subtotal_before_gst),
        delivery_fee_before_gst: round2(delivery_fee_before_gst),

        food_gst_amount: round2(food_gst_amount),
        delivery_gst_amount: round2(delivery_gst_amount),
        total_gst_amount: round2(total_gst_amount),

        cgst_amount: round2(half_gst),
        sgst_amount: round2(half_gst),

        subtotal_after_gst: round2(cart_total),
        delivery_fee_after_gst: round2(delivery_fee),
        grand_total: round2(grand_total),

        discount_amount: round2(discount_amount),
        wallet_deduction: round2(wallet_deduction),
        amount_to_pay: round2(amount_to_pay),
    }
}

/// Delivery-fee policy: free once the post-discount subtotal reaches the
/// restaurant's threshold, otherwise the flat fee. No threshold configured
/// means the flat fee always applies.
pub fn compute_delivery_fee(rst: &restaurant::Model, post_discount_subtotal: Decimal) -> Decimal {
    match rst.free_delivery_threshold {
        Some(threshold) if post_discount_subtotal >= threshold => Decimal::ZERO,
        _ => rst.delivery_fee,
    }
}

/// Platform revenue for one order, frozen at placement time.
///
/// Tech revenue is charged per unit sold, not per order. The delivery margin
/// only exists when a delivery fee was actually charged.
pub fn compute_net_profit(
    tech_fee: Decimal,
    total_quantity: u32,
    delivery_fee_charged: Decimal,
    delivery_rider_cost: Decimal,
) -> Decimal {
    let tech_revenue = tech_fee * Decimal::from(total_quantity);
    let delivery_margin = if delivery_fee_charged > Decimal::ZERO {
        delivery_fee_charged - delivery_rider_cost
    } else {
        Decimal::ZERO
    };
    tech_revenue + delivery_margin
}

static GSTIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN pattern")
});

/// Uppercases and strips separators from a GST registration number.
pub fn normalize_gstin(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Checks the 15-character GSTIN format (state code, PAN, entity code,
/// checksum slot). Format only; the checksum digit is not verified.
pub fn is_valid_gstin(raw: &str) -> bool {
    GSTIN_RE.is_match(&raw.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn inclusive_config() -> GstConfig {
        GstConfig {
            food_gst_rate: dec!(5.0),
            delivery_gst_rate: dec!(18.0),
            platform_gst_rate: dec!(18.0),
            gst_inclusive: true,
        }
    }

    fn restaurant(fee: Decimal, threshold: Option<Decimal>) -> restaurant::Model {
        restaurant::Model {
            id: Uuid::new_v4(),
            name: "Biryani House".to_string(),
            slug: "biryani-house".to_string(),
            owner_phone: "+919812345678".to_string(),
            upi_id: "biryani@upi".to_string(),
            is_active: true,
            tech_fee: dec!(5),
            delivery_fee: fee,
            free_delivery_threshold: threshold,
            rating_avg: dec!(0),
            rating_count: 0,
            credit_balance: dec!(500),
            min_balance_limit: dec!(-200),
            gst_number: None,
            is_gst_registered: true,
            food_gst_rate: dec!(5.0),
            gst_enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn inclusive_bill_backs_out_gst() {
        // ₹500 cart at 5% inclusive, ₹40 delivery at 18% inclusive, ₹50 off
        let bill = compute_bill(
            dec!(500),
            dec!(40),
            dec!(50),
            Decimal::ZERO,
            false,
            &inclusive_config(),
        );

        assert_eq!(bill.subtotal_before_gst, dec!(476.19));
        assert_eq!(bill.food_gst_amount, dec!(23.81));
        assert_eq!(bill.delivery_fee_before_gst, dec!(33.90));
        assert_eq!(bill.delivery_gst_amount, dec!(6.10));
        assert_eq!(bill.grand_total, dec!(490));
        assert_eq!(bill.amount_to_pay, dec!(490));
    }

    #[test]
    fn exclusive_bill_adds_tax_forward() {
        let config = GstConfig {
            gst_inclusive: false,
            ..inclusive_config()
        };
        let bill = compute_bill(
            dec!(200),
            dec!(50),
            Decimal::ZERO,
            Decimal::ZERO,
            false,
            &config,
        );

        assert_eq!(bill.subtotal_before_gst, dec!(200));
        assert_eq!(bill.food_gst_amount, dec!(10));
        assert_eq!(bill.delivery_gst_amount, dec!(9));
        assert_eq!(bill.total_gst_amount, dec!(19));
        // Exclusive totals still never re-add tax to the grand total
        assert_eq!(bill.grand_total, dec!(250));
    }

    #[test]
    fn cgst_and_sgst_are_exact_halves() {
        let bill = compute_bill(
            dec!(333),
            dec!(47),
            dec!(12),
            Decimal::ZERO,
            false,
            &inclusive_config(),
        );
        assert_eq!(bill.cgst_amount, bill.sgst_amount);
        assert_eq!(bill.cgst_amount * Decimal::TWO, bill.total_gst_amount);
    }

    #[test]
    fn wallet_deduction_is_clamped_to_grand_total() {
        let bill = compute_bill(
            dec!(100),
            dec!(0),
            dec!(0),
            dec!(500),
            true,
            &inclusive_config(),
        );
        assert_eq!(bill.wallet_deduction, dec!(100));
        assert_eq!(bill.amount_to_pay, dec!(0));

        let bill = compute_bill(
            dec!(100),
            dec!(0),
            dec!(0),
            dec!(30),
            true,
            &inclusive_config(),
        );
        assert_eq!(bill.wallet_deduction, dec!(30));
        assert_eq!(bill.amount_to_pay, dec!(70));
    }

    #[test]
    fn wallet_ignored_unless_requested() {
        let bill = compute_bill(
            dec!(100),
            dec!(0),
            dec!(0),
            dec!(500),
            false,
            &inclusive_config(),
        );
        assert_eq!(bill.wallet_deduction, dec!(0));
        assert_eq!(bill.amount_to_pay, dec!(100));
    }

    #[test]
    fn zero_rates_pass_amounts_through() {
        let config = GstConfig {
            food_gst_rate: Decimal::ZERO,
            delivery_gst_rate: Decimal::ZERO,
            platform_gst_rate: Decimal::ZERO,
            gst_inclusive: true,
        };
        let bill = compute_bill(
            dec!(250),
            dec!(40),
            Decimal::ZERO,
            Decimal::ZERO,
            false,
            &config,
        );
        assert_eq!(bill.subtotal_before_gst, dec!(250));
        assert_eq!(bill.total_gst_amount, dec!(0));
        assert_eq!(bill.grand_total, dec!(290));
    }

    #[test]
    fn free_delivery_at_threshold() {
        let rst = restaurant(dec!(40), Some(dec!(300)));
        assert_eq!(compute_delivery_fee(&rst, dec!(350)), dec!(0));
        assert_eq!(compute_delivery_fee(&rst, dec!(300)), dec!(0));
        assert_eq!(compute_delivery_fee(&rst, dec!(299)), dec!(40));
    }

    #[test]
    fn flat_fee_without_threshold() {
        let rst = restaurant(dec!(40), None);
        assert_eq!(compute_delivery_fee(&rst, dec!(10000)), dec!(40));
    }

    #[test]
    fn net_profit_charges_tech_fee_per_unit() {
        // 3 units at ₹5 tech fee, ₹40 delivery with ₹30 rider cost
        assert_eq!(
            compute_net_profit(dec!(5), 3, dec!(40), dec!(30)),
            dec!(25)
        );
        // Free delivery: no margin either way
        assert_eq!(compute_net_profit(dec!(5), 3, dec!(0), dec!(30)), dec!(15));
    }

    #[test]
    fn gstin_normalization_and_format() {
        assert_eq!(normalize_gstin("27aapfu0939f-1zv"), "27AAPFU0939F1ZV");
        assert!(is_valid_gstin("27AAPFU0939F1ZV"));
        assert!(!is_valid_gstin("INVALID"));
    }
}
