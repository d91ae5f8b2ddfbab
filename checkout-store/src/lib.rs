pub mod app_config;
pub mod customer_repo;
pub mod database;
pub mod fixtures;
pub mod memory;
pub mod order_repo;
pub mod reference_repo;

pub use customer_repo::PgCustomerRepository;
pub use database::DbClient;
pub use fixtures::{FixtureError, Fixtures, LoadedFixtures};
pub use memory::MemoryStore;
pub use order_repo::PgOrderRepository;
pub use reference_repo::PgReferenceRepository;

use checkout_core::RepositoryError;

pub(crate) fn db_error(err: sqlx::Error) -> RepositoryError {
    tracing::error!("Database error: {}", err);
    RepositoryError::Backend(err.to_string())
}
