//! Outbound message formatting: the WhatsApp order summary, UPI deep links,
//! and map links. Nothing here sends anything; the restaurant owner clicks
//! the generated link, so delivery stays manual by design of the product.

use rust_decimal::Decimal;
use url::form_urlencoded;

use crate::entities::order::{Model as OrderModel, OrderLine};

/// Normalizes an Indian phone number to E.164 (+91 default country code).
pub fn format_phone_number(phone: &str) -> String {
    if phone.starts_with("+91") {
        phone.to_string()
    } else {
        format!("+91{phone}")
    }
}

/// Parses "lat,lng" GPS coordinates. Returns `None` for anything malformed.
pub fn parse_gps_coordinates(coords: &str) -> Option<(f64, f64)> {
    let mut parts = coords.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lng))
}

pub fn google_maps_link(coords: &str) -> String {
    format!("https://maps.google.com/maps?q={coords}")
}

/// `upi://pay` deep link carrying payee id, payee name, amount, and a
/// transaction note. Constructed, never validated: the handset's UPI app
/// owns the rest of the flow.
pub fn upi_deep_link(
    upi_id: &str,
    payee_name: &str,
    amount: Decimal,
    order_short_id: &str,
) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("pa", upi_id)
        .append_pair("pn", payee_name)
        .append_pair("am", &amount.to_string())
        .append_pair("tn", &format!("Order-{order_short_id}"))
        .append_pair("cu", "INR")
        .finish();
    format!("upi://pay?{query}")
}

fn format_items(items: &[OrderLine]) -> String {
    items
        .iter()
        .map(|line| {
            let marker = if line.is_mystery { "\u{1f381} " } else { "" };
            format!("{}x {}{}", line.quantity, marker, line.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The new-order summary a restaurant owner forwards to their kitchen. The
/// bill lines echo the frozen order fields.
pub fn whatsapp_order_message(
    order: &OrderModel,
    customer_name: &str,
    customer_phone: &str,
) -> String {
    let map_link = order
        .gps_coordinates
        .as_deref()
        .map(google_maps_link)
        .unwrap_or_else(|| "Not provided".to_string());

    let items_list = format_items(&order.items.0);

    let coupon_text = match &order.coupon_code {
        Some(code) => format!(
            "\u{1f39f}\u{fe0f} Coupon: {} (Saved \u{20b9}{})\n",
            code, order.discount_amount
        ),
        None => String::new(),
    };

    let voice_text = match &order.voice_note_url {
        Some(url) => format!("\u{1f3a4} Voice Note: {url}\n"),
        None => String::new(),
    };

    let payment_status = if order.payment_method.is_prepaid() {
        "\u{2705} PAID ONLINE (Money in your Bank)"
    } else {
        "\u{26a0}\u{fe0f} COLLECT CASH/QR"
    };

    let food_total = order.items.subtotal();
    let delivery_line = if order.delivery_fee_charged.is_zero() {
        "FREE".to_string()
    } else {
        format!("\u{20b9}{}", order.delivery_fee_charged)
    };

    format!(
        "\u{1f514} NEW ORDER {short_id}\n\n\
         \u{1f464} Customer: {customer_name} ({customer_phone})\n\
         \u{1f4cd} Nav: {map_link}\n\n\
         \u{1f372} Items:\n{items_list}\n\n\
         {coupon_text}{voice_text}\n\
         \u{1f4b0} Bill Breakdown:\n\
         Food: \u{20b9}{food_total}\n\
         Delivery: {delivery_line}\n\
         TOTAL TO COLLECT: \u{20b9}{total}\n\n\
         \u{1f4b3} Payment Status:\n{payment_status}",
        short_id = order.short_id,
        total = order.total_amount,
    )
}

/// `wa.me` deep link with the message pre-filled. The phone is reduced to
/// digits as WhatsApp requires.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/{digits}?text={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::{OrderLines, OrderStatus, PaymentMethod, PaymentStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_order() -> OrderModel {
        OrderModel {
            id: Uuid::new_v4(),
            short_id: "TFN-7KQ2MX".to_string(),
            restaurant_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            rider_id: None,
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::CodCash,
            payment_status: PaymentStatus::Pending,
            payment_transaction_id: None,
            items: OrderLines(vec![OrderLine {
                id: Uuid::new_v4(),
                name: "Masala Dosa".to_string(),
                price: dec!(80),
                quantity: 2,
                is_mystery: false,
            }]),
            delivery_address: "14 MG Road, Indiranagar".to_string(),
            gps_coordinates: Some("12.9716,77.5946".to_string()),
            voice_note_url: None,
            coupon_code: Some("TASTY50".to_string()),
            discount_amount: dec!(50),
            subtotal_before_gst: dec!(152.38),
            food_gst_amount: dec!(7.62),
            delivery_gst_amount: dec!(6.10),
            total_gst_amount: dec!(13.72),
            cgst_amount: dec!(6.86),
            sgst_amount: dec!(6.86),
            total_amount: dec!(150),
            delivery_fee_charged: dec!(40),
            net_profit: dec!(20),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn phone_numbers_get_country_code_once() {
        assert_eq!(format_phone_number("9876543210"), "+919876543210");
        assert_eq!(format_phone_number("+919876543210"), "+919876543210");
    }

    #[test]
    fn gps_parsing_rejects_garbage() {
        assert_eq!(
            parse_gps_coordinates("12.9716, 77.5946"),
            Some((12.9716, 77.5946))
        );
        assert_eq!(parse_gps_coordinates("12.9716"), None);
        assert_eq!(parse_gps_coordinates("a,b"), None);
        assert_eq!(parse_gps_coordinates("1,2,3"), None);
    }

    #[test]
    fn upi_link_carries_payee_and_amount() {
        let link = upi_deep_link("dhaba@ybl", "Apna Dhaba", dec!(490), "TFN-7KQ2MX");
        assert!(link.starts_with("upi://pay?"));
        assert!(link.contains("pa=dhaba%40ybl"));
        assert!(link.contains("am=490"));
        assert!(link.contains("cu=INR"));
    }

    #[test]
    fn order_message_flags_cod_collection() {
        let message = whatsapp_order_message(&sample_order(), "Priya", "+919812345678");
        assert!(message.contains("TFN-7KQ2MX"));
        assert!(message.contains("2x Masala Dosa"));
        assert!(message.contains("COLLECT CASH/QR"));
        assert!(message.contains("TASTY50"));
    }

    #[test]
    fn whatsapp_link_strips_phone_formatting() {
        let link = whatsapp_link("+91 98765-43210", "hello");
        assert!(link.starts_with("https://wa.me/919876543210?text="));
    }
}
