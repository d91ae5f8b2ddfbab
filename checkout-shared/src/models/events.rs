use serde::{Deserialize, Serialize};

use crate::pii::Masked;

/// Emitted after every successful checkout state change.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutEvent {
    OrderAddressed(OrderAddressedEvent),
    ShippingMethodSelected(MethodSelectedEvent),
    PaymentMethodSelected(MethodSelectedEvent),
    CheckoutCompleted(CheckoutCompletedEvent),
    OrderCancelled(OrderCancelledEvent),
}

impl CheckoutEvent {
    pub fn order_id(&self) -> i64 {
        match self {
            CheckoutEvent::OrderAddressed(e) => e.order_id,
            CheckoutEvent::ShippingMethodSelected(e) => e.order_id,
            CheckoutEvent::PaymentMethodSelected(e) => e.order_id,
            CheckoutEvent::CheckoutCompleted(e) => e.order_id,
            CheckoutEvent::OrderCancelled(e) => e.order_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckoutEvent::OrderAddressed(_) => "ORDER_ADDRESSED",
            CheckoutEvent::ShippingMethodSelected(_) => "SHIPPING_METHOD_SELECTED",
            CheckoutEvent::PaymentMethodSelected(_) => "PAYMENT_METHOD_SELECTED",
            CheckoutEvent::CheckoutCompleted(_) => "CHECKOUT_COMPLETED",
            CheckoutEvent::OrderCancelled(_) => "ORDER_CANCELLED",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderAddressedEvent {
    pub order_id: i64,
    pub customer_id: i64,
    pub customer_email: Masked<String>,
    pub shipping_country: String,
    pub billing_country: String,
    pub uses_separate_billing_address: bool,
    pub previous_state: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MethodSelectedEvent {
    pub order_id: i64,
    pub method_code: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckoutCompletedEvent {
    pub order_id: i64,
    pub customer_id: Option<i64>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderCancelledEvent {
    pub order_id: i64,
    pub previous_state: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addressed_event_masks_email_in_debug() {
        let event = CheckoutEvent::OrderAddressed(OrderAddressedEvent {
            order_id: 7,
            customer_id: 1,
            customer_email: Masked::new("john@doe.com".to_string()),
            shipping_country: "NL".to_string(),
            billing_country: "NL".to_string(),
            uses_separate_billing_address: false,
            previous_state: "cart".to_string(),
            timestamp: 0,
        });

        let debug = format!("{:?}", event);
        assert!(!debug.contains("john@doe.com"));
        assert_eq!(event.order_id(), 7);
        assert_eq!(event.name(), "ORDER_ADDRESSED");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ORDER_ADDRESSED");
        assert_eq!(json["customer_email"], "john@doe.com");
    }
}
