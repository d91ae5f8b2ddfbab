use async_trait::async_trait;
use chrono::{DateTime, Utc};
use checkout_core::repository::OrderRepository;
use checkout_core::{Address, CheckoutState, Customer, Email, Order, OrderId, RepoResult, RepositoryError};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::db_error;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_id: Option<i64>,
    customer_email: Option<String>,
    customer_created_at: Option<DateTime<Utc>>,
    shipping_address: Option<Json<Address>>,
    billing_address: Option<Json<Address>>,
    uses_separate_billing_address: bool,
    checkout_state: String,
    shipping_method_code: Option<String>,
    payment_method_code: Option<String>,
    currency_code: String,
    locale_code: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    checkout_completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let checkout_state: CheckoutState = row
            .checkout_state
            .parse()
            .map_err(|e: checkout_core::CoreError| RepositoryError::Corrupt(format!("order {}: {}", row.id, e)))?;

        let customer = match (row.customer_id, row.customer_email, row.customer_created_at) {
            (Some(id), Some(email), Some(created_at)) => Some(Customer {
                id,
                email: Email::parse(&email)
                    .map_err(|e| RepositoryError::Corrupt(format!("customer {}: {}", id, e)))?,
                created_at,
            }),
            _ => None,
        };

        Ok(Order {
            id: row.id,
            customer,
            shipping_address: row.shipping_address.map(|a| a.0),
            billing_address: row.billing_address.map(|a| a.0),
            uses_separate_billing_address: row.uses_separate_billing_address,
            checkout_state,
            shipping_method: row.shipping_method_code,
            payment_method: row.payment_method_code,
            currency_code: row.currency_code,
            locale_code: row.locale_code,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            checkout_completed_at: row.checkout_completed_at,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT o.id, o.customer_id, c.email AS customer_email, c.created_at AS customer_created_at,
           o.shipping_address, o.billing_address, o.uses_separate_billing_address,
           o.checkout_state, o.shipping_method_code, o.payment_method_code,
           o.currency_code, o.locale_code, o.notes,
           o.created_at, o.updated_at, o.checkout_completed_at
    FROM orders o
    LEFT JOIN customers c ON c.id = o.customer_id
    WHERE o.id = $1
"#;

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(&self, currency_code: &str, locale_code: &str) -> RepoResult<Order> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (checkout_state, currency_code, locale_code)
            VALUES ('cart', $1, $2)
            RETURNING id
            "#,
        )
        .bind(currency_code)
        .bind(locale_code)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        self.get_order(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("order {}", id)))
    }

    async fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(SELECT_ORDER)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(Order::try_from).transpose()
    }

    async fn save_order(&self, order: &Order, expected_state: CheckoutState) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET customer_id = $2,
                shipping_address = $3,
                billing_address = $4,
                uses_separate_billing_address = $5,
                checkout_state = $6,
                shipping_method_code = $7,
                payment_method_code = $8,
                notes = $9,
                updated_at = $10,
                checkout_completed_at = $11
            WHERE id = $1 AND checkout_state = $12
            "#,
        )
        .bind(order.id)
        .bind(order.customer_id())
        .bind(order.shipping_address.clone().map(Json))
        .bind(order.billing_address.clone().map(Json))
        .bind(order.uses_separate_billing_address)
        .bind(order.checkout_state.as_str())
        .bind(order.shipping_method.as_deref())
        .bind(order.payment_method.as_deref())
        .bind(order.notes.as_deref())
        .bind(order.updated_at)
        .bind(order.checkout_completed_at)
        .bind(expected_state.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let current: Option<String> = sqlx::query_scalar("SELECT checkout_state FROM orders WHERE id = $1")
            .bind(order.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match current {
            Some(state) => Err(RepositoryError::Conflict(format!(
                "order {} is {}, expected {}",
                order.id, state, expected_state
            ))),
            None => Err(RepositoryError::NotFound(format!("order {}", order.id))),
        }
    }
}
