use std::sync::Arc;

use chrono::Utc;
use checkout_core::repository::{
    CountryRepository, CustomerRepository, OrderRepository, PaymentMethodRepository,
    ShippingMethodRepository,
};
use checkout_core::{CheckoutState, Order, OrderId, RepositoryError, ValidationErrors};
use checkout_shared::models::events::{
    CheckoutCompletedEvent, CheckoutEvent, MethodSelectedEvent, OrderAddressedEvent,
    OrderCancelledEvent,
};
use checkout_shared::Masked;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::addressing::AddressingRequest;
use crate::state_machine::{self, Transition};
use crate::{CheckoutError, CheckoutResult};

/// Storage the checkout flow reads and writes.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub countries: Arc<dyn CountryRepository>,
    pub shipping_methods: Arc<dyn ShippingMethodRepository>,
    pub payment_methods: Arc<dyn PaymentMethodRepository>,
}

impl Repositories {
    /// All five repositories served by one backend.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OrderRepository
            + CustomerRepository
            + CountryRepository
            + ShippingMethodRepository
            + PaymentMethodRepository
            + 'static,
    {
        Self {
            orders: store.clone(),
            customers: store.clone(),
            countries: store.clone(),
            shipping_methods: store.clone(),
            payment_methods: store,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartDefaults {
    pub currency_code: String,
    pub locale_code: String,
}

impl Default for CartDefaults {
    fn default() -> Self {
        Self {
            currency_code: "EUR".to_string(),
            locale_code: "en_US".to_string(),
        }
    }
}

/// Runs the checkout steps against an order: addressing, shipping and payment
/// selection, completion and cancellation.
///
/// Every step validates before it writes, so a rejected request leaves the
/// stored order exactly as it was.
pub struct CheckoutService {
    repos: Repositories,
    events: broadcast::Sender<CheckoutEvent>,
    defaults: CartDefaults,
}

impl CheckoutService {
    pub fn new(repos: Repositories, events: broadcast::Sender<CheckoutEvent>, defaults: CartDefaults) -> Self {
        Self { repos, events, defaults }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CheckoutEvent> {
        self.events.subscribe()
    }

    pub async fn create_cart(&self, currency_code: Option<&str>, locale_code: Option<&str>) -> CheckoutResult<Order> {
        let currency = currency_code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| self.defaults.currency_code.clone());
        let locale = locale_code
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.defaults.locale_code.as_str())
            .to_string();

        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationErrors::single("currency_code", "Currency code must be three letters.").into());
        }

        let order = self.repos.orders.create_order(&currency, &locale).await?;
        info!("Cart {} created ({}, {})", order.id, order.currency_code, order.locale_code);
        Ok(order)
    }

    pub async fn get_order(&self, order_id: OrderId) -> CheckoutResult<Order> {
        self.repos
            .orders
            .get_order(order_id)
            .await?
            .ok_or(CheckoutError::NotFound(order_id))
    }

    /// Replaces the customer and both addresses of an already loaded order and
    /// rewinds it to `addressed`.
    ///
    /// Allowed from every non-terminal state. Shipping and payment method
    /// choices are kept but have to be confirmed again.
    pub async fn address_order(&self, mut order: Order, request: &AddressingRequest) -> CheckoutResult<Order> {
        let addressing = request.validate(self.repos.countries.as_ref()).await?;
        state_machine::ensure_allowed(&order, Transition::Address)?;

        let customer = self.repos.customers.find_or_create(&addressing.email).await?;
        debug!("Order {} resolved customer {} ({})", order.id, customer.id, Masked::new(customer.email.as_str()));

        order.assign_addresses(customer.clone(), addressing.shipping, addressing.billing);
        let previous = state_machine::apply(&mut order, Transition::Address)?;
        self.save(&order, previous).await?;

        info!("Order {} addressed (was {})", order.id, previous);

        let shipping_country = order
            .shipping_address
            .as_ref()
            .map(|a| a.country_code.clone())
            .unwrap_or_default();
        let billing_country = order
            .billing_address
            .as_ref()
            .map(|a| a.country_code.clone())
            .unwrap_or_default();

        self.publish(CheckoutEvent::OrderAddressed(OrderAddressedEvent {
            order_id: order.id,
            customer_id: customer.id,
            customer_email: Masked::new(customer.email.to_string()),
            shipping_country,
            billing_country,
            uses_separate_billing_address: order.uses_separate_billing_address,
            previous_state: previous.to_string(),
            timestamp: Utc::now().timestamp(),
        }));

        Ok(order)
    }

    pub async fn select_shipping(&self, order_id: OrderId, method_code: Option<&str>) -> CheckoutResult<Order> {
        let mut order = self.get_order(order_id).await?;

        let code = required_code(method_code, "shipping_method", "Please select shipping method.")?;
        match self.repos.shipping_methods.find_shipping_method(&code).await? {
            Some(method) if method.enabled => {}
            _ => {
                return Err(ValidationErrors::single(
                    "shipping_method",
                    format!("Shipping method \"{}\" is not available.", code),
                )
                .into())
            }
        }

        let previous = state_machine::apply(&mut order, Transition::SelectShipping)?;
        order.shipping_method = Some(code.clone());
        self.save(&order, previous).await?;

        info!("Order {} shipping method set to {}", order.id, code);
        self.publish(CheckoutEvent::ShippingMethodSelected(MethodSelectedEvent {
            order_id: order.id,
            method_code: code,
            timestamp: Utc::now().timestamp(),
        }));

        Ok(order)
    }

    pub async fn select_payment(&self, order_id: OrderId, method_code: Option<&str>) -> CheckoutResult<Order> {
        let mut order = self.get_order(order_id).await?;

        let code = required_code(method_code, "payment_method", "Please select payment method.")?;
        match self.repos.payment_methods.find_payment_method(&code).await? {
            Some(method) if method.enabled => {}
            _ => {
                return Err(ValidationErrors::single(
                    "payment_method",
                    format!("Payment method \"{}\" is not available.", code),
                )
                .into())
            }
        }

        let previous = state_machine::apply(&mut order, Transition::SelectPayment)?;
        order.payment_method = Some(code.clone());
        self.save(&order, previous).await?;

        info!("Order {} payment method set to {}", order.id, code);
        self.publish(CheckoutEvent::PaymentMethodSelected(MethodSelectedEvent {
            order_id: order.id,
            method_code: code,
            timestamp: Utc::now().timestamp(),
        }));

        Ok(order)
    }

    pub async fn complete(&self, order_id: OrderId, notes: Option<&str>) -> CheckoutResult<Order> {
        let mut order = self.get_order(order_id).await?;

        let previous = state_machine::apply(&mut order, Transition::Complete)?;
        let completed_at = Utc::now();
        order.checkout_completed_at = Some(completed_at);
        order.notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        self.save(&order, previous).await?;

        info!("Order {} checkout completed", order.id);
        self.publish(CheckoutEvent::CheckoutCompleted(CheckoutCompletedEvent {
            order_id: order.id,
            customer_id: order.customer_id(),
            completed_at,
            timestamp: completed_at.timestamp(),
        }));

        Ok(order)
    }

    /// Cancelling an already cancelled order succeeds without writing.
    pub async fn cancel(&self, order_id: OrderId) -> CheckoutResult<Order> {
        let mut order = self.get_order(order_id).await?;
        if order.checkout_state == CheckoutState::Cancelled {
            return Ok(order);
        }

        let previous = state_machine::apply(&mut order, Transition::Cancel)?;
        self.save(&order, previous).await?;

        info!("Order {} cancelled (was {})", order.id, previous);
        self.publish(CheckoutEvent::OrderCancelled(OrderCancelledEvent {
            order_id: order.id,
            previous_state: previous.to_string(),
            timestamp: Utc::now().timestamp(),
        }));

        Ok(order)
    }

    /// Writes `order` back unless another request moved it out of `read_state`.
    async fn save(&self, order: &Order, read_state: CheckoutState) -> CheckoutResult<()> {
        self.repos
            .orders
            .save_order(order, read_state)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(reason) => {
                    warn!("Dropped stale write: {}", reason);
                    CheckoutError::StaleOrder(order.id)
                }
                other => other.into(),
            })
    }

    fn publish(&self, event: CheckoutEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn required_code(code: Option<&str>, path: &str, message: &str) -> Result<String, ValidationErrors> {
    match code.map(str::trim) {
        Some(c) if !c.is_empty() => Ok(c.to_string()),
        _ => Err(ValidationErrors::single(path, message)),
    }
}
