//! Property-based coverage for the bill computation: the monetary identity,
//! the CGST/SGST split, and the inclusive-mode round trip.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tiffin_api::services::pricing::{compute_bill, GstConfig};

fn default_config() -> GstConfig {
    GstConfig {
        food_gst_rate: dec!(5.0),
        delivery_gst_rate: dec!(18.0),
        platform_gst_rate: dec!(18.0),
        gst_inclusive: true,
    }
}

/// Two-decimal currency amounts in paise, up to ₹50,000.
fn money(max_paise: i64) -> impl Strategy<Value = Decimal> {
    (0..=max_paise).prop_map(|paise| Decimal::new(paise, 2))
}

proptest! {
    /// amount_to_pay == subtotal + delivery fee - discount - wallet deduction
    /// for every valid input, to 2 decimal places.
    #[test]
    fn monetary_identity_holds(
        subtotal in money(5_000_000),
        delivery_fee in money(20_000),
        discount_paise in 0..=100_000i64,
        wallet in money(1_000_000),
        use_wallet in any::<bool>(),
    ) {
        let discount = Decimal::new(discount_paise, 2).min(subtotal);
        let bill = compute_bill(subtotal, delivery_fee, discount, wallet, use_wallet, &default_config());

        prop_assert_eq!(
            bill.amount_to_pay,
            subtotal + delivery_fee - discount - bill.wallet_deduction
        );
    }

    /// CGST and SGST are exact halves of the total, always equal.
    #[test]
    fn gst_split_is_symmetric(
        subtotal in money(5_000_000),
        delivery_fee in money(20_000),
    ) {
        let bill = compute_bill(subtotal, delivery_fee, Decimal::ZERO, Decimal::ZERO, false, &default_config());
        prop_assert_eq!(bill.cgst_amount, bill.sgst_amount);
    }

    /// Inclusive mode: backing out the base and re-applying the rate lands
    /// back on the cart total, within rounding tolerance.
    #[test]
    fn inclusive_round_trips(subtotal in money(5_000_000)) {
        let config = default_config();
        let bill = compute_bill(subtotal, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, false, &config);

        let reconstructed = bill.subtotal_before_gst
            * (Decimal::ONE + config.food_gst_rate / Decimal::ONE_HUNDRED);
        let drift = (reconstructed - subtotal).abs();
        prop_assert!(drift <= dec!(0.02), "drift {} too large", drift);
    }

    /// The wallet deduction never exceeds the grand total or the balance,
    /// and is zero when wallet usage is off.
    #[test]
    fn wallet_deduction_is_clamped(
        subtotal in money(5_000_000),
        wallet in money(10_000_000),
        use_wallet in any::<bool>(),
    ) {
        let bill = compute_bill(subtotal, Decimal::ZERO, Decimal::ZERO, wallet, use_wallet, &default_config());

        if use_wallet {
            prop_assert!(bill.wallet_deduction <= bill.grand_total);
            prop_assert!(bill.wallet_deduction <= wallet);
        } else {
            prop_assert_eq!(bill.wallet_deduction, Decimal::ZERO);
        }
        prop_assert!(bill.amount_to_pay >= Decimal::ZERO);
    }
}

#[test]
fn worked_example_from_finance() {
    // ₹500 cart at 5% inclusive, ₹40 delivery at 18% inclusive, ₹50 coupon
    let bill = compute_bill(
        dec!(500),
        dec!(40),
        dec!(50),
        Decimal::ZERO,
        false,
        &default_config(),
    );

    assert_eq!(bill.subtotal_before_gst, dec!(476.19));
    assert_eq!(bill.food_gst_amount, dec!(23.81));
    assert_eq!(bill.delivery_fee_before_gst, dec!(33.90));
    assert_eq!(bill.delivery_gst_amount, dec!(6.10));
    assert_eq!(bill.grand_total, dec!(490));
    assert_eq!(bill.amount_to_pay, dec!(490));
}
