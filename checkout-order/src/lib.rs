pub mod addressing;
pub mod checkout;
pub mod state_machine;

pub use addressing::{Addressing, AddressingRequest, CustomerInput};
pub use checkout::{CartDefaults, CheckoutService, Repositories};
pub use state_machine::Transition;

use checkout_core::{CheckoutState, OrderId, RepositoryError, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Cannot {transition} an order in state {from}")]
    InvalidTransition {
        from: CheckoutState,
        transition: Transition,
    },

    #[error("Order {0} was changed by another request, reload it and retry")]
    StaleOrder(OrderId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ValidationErrors> for CheckoutError {
    fn from(errors: ValidationErrors) -> Self {
        CheckoutError::Validation(errors)
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;
