use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::email::Email;
use crate::CoreError;

pub type OrderId = i64;

/// Position of an order in the checkout flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Cart,
    Addressed,
    ShippingSelected,
    PaymentSelected,
    Completed,
    Cancelled,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Cart => "cart",
            CheckoutState::Addressed => "addressed",
            CheckoutState::ShippingSelected => "shipping_selected",
            CheckoutState::PaymentSelected => "payment_selected",
            CheckoutState::Completed => "completed",
            CheckoutState::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled orders no longer accept checkout changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Completed | CheckoutState::Cancelled)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(CheckoutState::Cart),
            "addressed" => Ok(CheckoutState::Addressed),
            "shipping_selected" => Ok(CheckoutState::ShippingSelected),
            "payment_selected" => Ok(CheckoutState::PaymentSelected),
            "completed" => Ok(CheckoutState::Completed),
            "cancelled" => Ok(CheckoutState::Cancelled),
            other => Err(CoreError::UnknownCheckoutState(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// An order moving through checkout.
///
/// When `uses_separate_billing_address` is false the billing address is a copy
/// of the shipping address; [`Order::assign_addresses`] keeps the two in step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: Option<Customer>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub uses_separate_billing_address: bool,
    pub checkout_state: CheckoutState,
    pub shipping_method: Option<String>,
    pub payment_method: Option<String>,
    pub currency_code: String,
    pub locale_code: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub checkout_completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new_cart(id: OrderId, currency_code: &str, locale_code: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer: None,
            shipping_address: None,
            billing_address: None,
            uses_separate_billing_address: false,
            checkout_state: CheckoutState::Cart,
            shipping_method: None,
            payment_method: None,
            currency_code: currency_code.to_string(),
            locale_code: locale_code.to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
            checkout_completed_at: None,
        }
    }

    /// Replaces customer and both addresses. `billing == None` mirrors shipping.
    pub fn assign_addresses(&mut self, customer: Customer, shipping: Address, billing: Option<Address>) {
        self.customer = Some(customer);
        self.uses_separate_billing_address = billing.is_some();
        self.billing_address = Some(billing.unwrap_or_else(|| shipping.clone()));
        self.shipping_address = Some(shipping);
        self.updated_at = Utc::now();
    }

    pub fn update_state(&mut self, state: CheckoutState) {
        self.checkout_state = state;
        self.updated_at = Utc::now();
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.customer.as_ref().map(|c| c.id)
    }
}
