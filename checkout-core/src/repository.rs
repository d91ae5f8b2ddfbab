use async_trait::async_trait;

use crate::email::Email;
use crate::order::{CheckoutState, Customer, Order, OrderId};
use crate::reference::{Country, PaymentMethod, ShippingMethod};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    /// The stored record moved on since it was read.
    #[error("Stale write: {0}")]
    Conflict(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Creates an empty cart and returns it with its assigned id.
    async fn create_order(&self, currency_code: &str, locale_code: &str) -> RepoResult<Order>;

    async fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;

    /// Overwrites the stored order, provided it is still in `expected_state`.
    /// Fails with `NotFound` if it does not exist and `Conflict` if another
    /// write moved it to a different state.
    async fn save_order(&self, order: &Order, expected_state: CheckoutState) -> RepoResult<()>;
}

/// Repository trait for customer data access
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Returns the customer with the same canonical email, creating one if needed.
    async fn find_or_create(&self, email: &Email) -> RepoResult<Customer>;
}

#[async_trait]
pub trait CountryRepository: Send + Sync {
    async fn find_country(&self, code: &str) -> RepoResult<Option<Country>>;
}

#[async_trait]
pub trait ShippingMethodRepository: Send + Sync {
    async fn find_shipping_method(&self, code: &str) -> RepoResult<Option<ShippingMethod>>;
}

#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    async fn find_payment_method(&self, code: &str) -> RepoResult<Option<PaymentMethod>>;
}
