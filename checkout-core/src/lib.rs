pub mod address;
pub mod email;
pub mod order;
pub mod reference;
pub mod repository;
pub mod validation;

pub use address::{Address, AddressInput};
pub use email::{Email, EmailError};
pub use order::{CheckoutState, Customer, Order, OrderId};
pub use reference::{Country, PaymentMethod, ShippingMethod};
pub use repository::{RepoResult, RepositoryError};
pub use validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown checkout state: {0}")]
    UnknownCheckoutState(String),
}
