//! YAML seed data for the in-memory store.
//!
//! ```yaml
//! countries:
//!   - { code: NL, name: Netherlands }
//! shipping_methods:
//!   - { code: ups, name: UPS }
//! payment_methods:
//!   - { code: cash_on_delivery, name: Cash on delivery }
//! orders:
//!   - name: order1
//!     currency_code: EUR
//! ```
//!
//! Orders get ids in file order; [`LoadedFixtures::order_id`] maps fixture
//! names back to them.

use std::collections::HashMap;
use std::path::Path;

use checkout_core::repository::{
    CustomerRepository, OrderRepository, PaymentMethodRepository, ShippingMethodRepository,
};
use checkout_core::{
    AddressInput, CheckoutState, Country, Email, EmailError, OrderId, PaymentMethod,
    RepositoryError, ShippingMethod, ValidationErrors,
};
use serde::Deserialize;
use tracing::info;

use crate::memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid fixture YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Fixture order {order}: invalid customer email: {source}")]
    InvalidEmail { order: String, source: EmailError },
    #[error("Fixture order {order}: invalid address: {errors}")]
    InvalidAddress { order: String, errors: ValidationErrors },
    #[error("Fixture order {0} is listed twice")]
    DuplicateOrder(String),
    #[error("Fixture order {0} has a billing address but no shipping address")]
    BillingWithoutShipping(String),
    #[error("Fixture order {order}: unknown shipping method {code}")]
    UnknownShippingMethod { order: String, code: String },
    #[error("Fixture order {order}: unknown payment method {code}")]
    UnknownPaymentMethod { order: String, code: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub orders: Vec<OrderFixture>,
}

#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    pub name: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub locale_code: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<AddressInput>,
    #[serde(default)]
    pub billing_address: Option<AddressInput>,
    #[serde(default)]
    pub checkout_state: Option<CheckoutState>,
    #[serde(default)]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct LoadedFixtures {
    orders: HashMap<String, OrderId>,
}

impl LoadedFixtures {
    pub fn order_id(&self, name: &str) -> Option<OrderId> {
        self.orders.get(name).copied()
    }
}

impl Fixtures {
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Seeds `store`. Orders are written as given, without running checkout
    /// validation, so fixtures can describe any starting state.
    pub async fn load_into(&self, store: &MemoryStore) -> Result<LoadedFixtures, FixtureError> {
        for country in &self.countries {
            store.add_country(country.clone()).await;
        }
        for method in &self.shipping_methods {
            store.add_shipping_method(method.clone()).await;
        }
        for method in &self.payment_methods {
            store.add_payment_method(method.clone()).await;
        }

        let mut loaded = LoadedFixtures::default();
        for fixture in &self.orders {
            if loaded.orders.contains_key(&fixture.name) {
                return Err(FixtureError::DuplicateOrder(fixture.name.clone()));
            }
            if fixture.billing_address.is_some() && fixture.shipping_address.is_none() {
                return Err(FixtureError::BillingWithoutShipping(fixture.name.clone()));
            }
            if let Some(code) = &fixture.shipping_method {
                if store.find_shipping_method(code).await?.is_none() {
                    return Err(FixtureError::UnknownShippingMethod {
                        order: fixture.name.clone(),
                        code: code.clone(),
                    });
                }
            }
            if let Some(code) = &fixture.payment_method {
                if store.find_payment_method(code).await?.is_none() {
                    return Err(FixtureError::UnknownPaymentMethod {
                        order: fixture.name.clone(),
                        code: code.clone(),
                    });
                }
            }

            let mut order = store
                .create_order(
                    fixture.currency_code.as_deref().unwrap_or("EUR"),
                    fixture.locale_code.as_deref().unwrap_or("en_US"),
                )
                .await?;

            if let Some(raw) = &fixture.customer {
                let email = Email::parse(raw).map_err(|source| FixtureError::InvalidEmail {
                    order: fixture.name.clone(),
                    source,
                })?;
                order.customer = Some(store.find_or_create(&email).await?);
            }

            let mut errors = ValidationErrors::new();
            let shipping = fixture
                .shipping_address
                .as_ref()
                .and_then(|a| a.validate("shipping_address", &mut errors));
            let billing = fixture
                .billing_address
                .as_ref()
                .and_then(|a| a.validate("billing_address", &mut errors));
            if !errors.is_empty() {
                return Err(FixtureError::InvalidAddress {
                    order: fixture.name.clone(),
                    errors,
                });
            }

            if let Some(shipping) = shipping {
                order.uses_separate_billing_address = billing.is_some();
                order.billing_address = Some(billing.unwrap_or_else(|| shipping.clone()));
                order.shipping_address = Some(shipping);
            }
            if let Some(state) = fixture.checkout_state {
                order.checkout_state = state;
            }
            order.shipping_method = fixture.shipping_method.clone();
            order.payment_method = fixture.payment_method.clone();

            store.save_order(&order, CheckoutState::Cart).await?;
            loaded.orders.insert(fixture.name.clone(), order.id);
        }

        info!(
            "Loaded fixtures: {} countries, {} shipping methods, {} payment methods, {} orders",
            self.countries.len(),
            self.shipping_methods.len(),
            self.payment_methods.len(),
            self.orders.len()
        );

        Ok(loaded)
    }
}
