use async_trait::async_trait;
use chrono::{DateTime, Utc};
use checkout_core::repository::CustomerRepository;
use checkout_core::{Customer, Email, RepoResult, RepositoryError};
use sqlx::PgPool;

use crate::db_error;

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::Corrupt(format!("customer {}: {}", row.id, e)))?;
        Ok(Customer {
            id: row.id,
            email,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_or_create(&self, email: &Email) -> RepoResult<Customer> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            INSERT INTO customers (email, email_canonical)
            VALUES ($1, $2)
            ON CONFLICT (email_canonical) DO UPDATE SET email_canonical = EXCLUDED.email_canonical
            RETURNING id, email, created_at
            "#,
        )
        .bind(email.as_str())
        .bind(email.canonical())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Customer::try_from(row)
    }
}
