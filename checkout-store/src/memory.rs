use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use checkout_core::repository::{
    CountryRepository, CustomerRepository, OrderRepository, PaymentMethodRepository,
    ShippingMethodRepository,
};
use checkout_core::{
    CheckoutState, Country, Customer, Email, Order, OrderId, PaymentMethod, RepoResult, RepositoryError,
    ShippingMethod,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    last_order_id: OrderId,
    // keyed by canonical email
    customers: HashMap<String, Customer>,
    last_customer_id: i64,
    countries: HashMap<String, Country>,
    shipping_methods: HashMap<String, ShippingMethod>,
    payment_methods: HashMap<String, PaymentMethod>,
}

/// Process-local implementation of every checkout repository.
///
/// Ids are assigned sequentially from 1, like a fresh database sequence.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_country(&self, country: Country) {
        let mut inner = self.inner.write().await;
        inner.countries.insert(country.code.to_uppercase(), country);
    }

    pub async fn add_shipping_method(&self, method: ShippingMethod) {
        let mut inner = self.inner.write().await;
        inner.shipping_methods.insert(method.code.clone(), method);
    }

    pub async fn add_payment_method(&self, method: PaymentMethod) {
        let mut inner = self.inner.write().await;
        inner.payment_methods.insert(method.code.clone(), method);
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, currency_code: &str, locale_code: &str) -> RepoResult<Order> {
        let mut inner = self.inner.write().await;
        inner.last_order_id += 1;
        let order = Order::new_cart(inner.last_order_id, currency_code, locale_code);
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn save_order(&self, order: &Order, expected_state: CheckoutState) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order.id) {
            Some(stored) if stored.checkout_state != expected_state => Err(RepositoryError::Conflict(format!(
                "order {} is {}, expected {}",
                order.id, stored.checkout_state, expected_state
            ))),
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("order {}", order.id))),
        }
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn find_or_create(&self, email: &Email) -> RepoResult<Customer> {
        let mut inner = self.inner.write().await;
        let key = email.canonical();
        if let Some(customer) = inner.customers.get(&key) {
            return Ok(customer.clone());
        }

        inner.last_customer_id += 1;
        let customer = Customer {
            id: inner.last_customer_id,
            email: email.clone(),
            created_at: Utc::now(),
        };
        inner.customers.insert(key, customer.clone());
        Ok(customer)
    }
}

#[async_trait]
impl CountryRepository for MemoryStore {
    async fn find_country(&self, code: &str) -> RepoResult<Option<Country>> {
        Ok(self.inner.read().await.countries.get(&code.to_uppercase()).cloned())
    }
}

#[async_trait]
impl ShippingMethodRepository for MemoryStore {
    async fn find_shipping_method(&self, code: &str) -> RepoResult<Option<ShippingMethod>> {
        Ok(self.inner.read().await.shipping_methods.get(code).cloned())
    }
}

#[async_trait]
impl PaymentMethodRepository for MemoryStore {
    async fn find_payment_method(&self, code: &str) -> RepoResult<Option<PaymentMethod>> {
        Ok(self.inner.read().await.payment_methods.get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_order_ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.create_order("EUR", "en_US").await.unwrap();
        let b = store.create_order("USD", "en_US").await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(store.get_order(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_and_rejects_unknown() {
        let store = MemoryStore::new();
        let mut order = store.create_order("EUR", "en_US").await.unwrap();
        order.update_state(CheckoutState::Cancelled);
        store.save_order(&order, CheckoutState::Cart).await.unwrap();

        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.checkout_state, CheckoutState::Cancelled);

        let ghost = Order::new_cart(99, "EUR", "en_US");
        assert!(matches!(
            store.save_order(&ghost, CheckoutState::Cart).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_rejects_order_that_moved_on() {
        let store = MemoryStore::new();
        let stale = store.create_order("EUR", "en_US").await.unwrap();

        let mut cancelled = stale.clone();
        cancelled.update_state(CheckoutState::Cancelled);
        store.save_order(&cancelled, CheckoutState::Cart).await.unwrap();

        let mut addressed = stale;
        addressed.update_state(CheckoutState::Addressed);
        assert!(matches!(
            store.save_order(&addressed, CheckoutState::Cart).await,
            Err(RepositoryError::Conflict(_))
        ));

        let stored = store.get_order(cancelled.id).await.unwrap().unwrap();
        assert_eq!(stored.checkout_state, CheckoutState::Cancelled);
    }

    #[tokio::test]
    async fn test_find_or_create_customer_uses_canonical_email() {
        let store = MemoryStore::new();
        let first = store.find_or_create(&Email::parse("John@Doe.com").unwrap()).await.unwrap();
        let again = store.find_or_create(&Email::parse("john@doe.com").unwrap()).await.unwrap();
        let other = store.find_or_create(&Email::parse("jane@doe.com").unwrap()).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.email.as_str(), "John@Doe.com");
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_country_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .add_country(Country { code: "nl".into(), name: None, enabled: true })
            .await;

        assert!(store.find_country("NL").await.unwrap().is_some());
        assert!(store.find_country("nl").await.unwrap().is_some());
        assert!(store.find_country("DE").await.unwrap().is_none());
    }
}
