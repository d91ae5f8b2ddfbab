use async_trait::async_trait;
use checkout_core::repository::{CountryRepository, PaymentMethodRepository, ShippingMethodRepository};
use checkout_core::{Country, PaymentMethod, RepoResult, ShippingMethod};
use sqlx::PgPool;

use crate::db_error;

/// Countries, shipping methods and payment methods. Read-only from the checkout's side.
pub struct PgReferenceRepository {
    pool: PgPool,
}

impl PgReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MethodRow {
    code: String,
    name: String,
    enabled: bool,
}

#[async_trait]
impl CountryRepository for PgReferenceRepository {
    async fn find_country(&self, code: &str) -> RepoResult<Option<Country>> {
        let row: Option<(String, Option<String>, bool)> =
            sqlx::query_as("SELECT code, name, enabled FROM countries WHERE code = $1")
                .bind(code.to_uppercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(row.map(|(code, name, enabled)| Country { code, name, enabled }))
    }
}

#[async_trait]
impl ShippingMethodRepository for PgReferenceRepository {
    async fn find_shipping_method(&self, code: &str) -> RepoResult<Option<ShippingMethod>> {
        let row = sqlx::query_as::<_, MethodRow>(
            "SELECT code, name, enabled FROM shipping_methods WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| ShippingMethod { code: r.code, name: r.name, enabled: r.enabled }))
    }
}

#[async_trait]
impl PaymentMethodRepository for PgReferenceRepository {
    async fn find_payment_method(&self, code: &str) -> RepoResult<Option<PaymentMethod>> {
        let row = sqlx::query_as::<_, MethodRow>(
            "SELECT code, name, enabled FROM payment_methods WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| PaymentMethod { code: r.code, name: r.name, enabled: r.enabled }))
    }
}
