use std::fmt;

use checkout_core::{CheckoutState, Order};

use crate::CheckoutError;

/// Checkout transitions and the states each one may start from.
///
/// ```text
/// cart ──address──▶ addressed ──select_shipping──▶ shipping_selected ──select_payment──▶ payment_selected ──complete──▶ completed
///   ▲                  ▲  (address again from any non-terminal state rewinds here)
///   └── cancel from any non-terminal state ──▶ cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Address,
    SelectShipping,
    SelectPayment,
    Complete,
    Cancel,
}

impl Transition {
    pub fn target(&self) -> CheckoutState {
        match self {
            Transition::Address => CheckoutState::Addressed,
            Transition::SelectShipping => CheckoutState::ShippingSelected,
            Transition::SelectPayment => CheckoutState::PaymentSelected,
            Transition::Complete => CheckoutState::Completed,
            Transition::Cancel => CheckoutState::Cancelled,
        }
    }

    pub fn allowed_from(&self, from: CheckoutState) -> bool {
        use CheckoutState::*;
        match self {
            Transition::Address | Transition::Cancel => !from.is_terminal(),
            Transition::SelectShipping => matches!(from, Addressed | ShippingSelected | PaymentSelected),
            Transition::SelectPayment => matches!(from, ShippingSelected | PaymentSelected),
            Transition::Complete => from == PaymentSelected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Address => "address",
            Transition::SelectShipping => "select shipping for",
            Transition::SelectPayment => "select payment for",
            Transition::Complete => "complete",
            Transition::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fails without touching the order if `transition` is not allowed from its current state.
pub fn ensure_allowed(order: &Order, transition: Transition) -> Result<(), CheckoutError> {
    if transition.allowed_from(order.checkout_state) {
        Ok(())
    } else {
        Err(CheckoutError::InvalidTransition {
            from: order.checkout_state,
            transition,
        })
    }
}

/// Moves the order along `transition` and returns the state it left.
pub fn apply(order: &mut Order, transition: Transition) -> Result<CheckoutState, CheckoutError> {
    ensure_allowed(order, transition)?;
    let previous = order.checkout_state;
    order.update_state(transition.target());
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut order = Order::new_cart(1, "EUR", "en_US");

        assert_eq!(apply(&mut order, Transition::Address).unwrap(), CheckoutState::Cart);
        apply(&mut order, Transition::SelectShipping).unwrap();
        apply(&mut order, Transition::SelectPayment).unwrap();
        assert_eq!(
            apply(&mut order, Transition::Complete).unwrap(),
            CheckoutState::PaymentSelected
        );
        assert_eq!(order.checkout_state, CheckoutState::Completed);
    }

    #[test]
    fn test_address_allowed_until_terminal() {
        use CheckoutState::*;
        for state in [Cart, Addressed, ShippingSelected, PaymentSelected] {
            assert!(Transition::Address.allowed_from(state), "{state}");
        }
        assert!(!Transition::Address.allowed_from(Completed));
        assert!(!Transition::Address.allowed_from(Cancelled));
    }

    #[test]
    fn test_readdressing_rewinds_to_addressed() {
        let mut order = Order::new_cart(1, "EUR", "en_US");
        apply(&mut order, Transition::Address).unwrap();
        apply(&mut order, Transition::SelectShipping).unwrap();
        apply(&mut order, Transition::SelectPayment).unwrap();

        let previous = apply(&mut order, Transition::Address).unwrap();
        assert_eq!(previous, CheckoutState::PaymentSelected);
        assert_eq!(order.checkout_state, CheckoutState::Addressed);
    }

    #[test]
    fn test_invalid_transition_leaves_state_untouched() {
        let mut order = Order::new_cart(1, "EUR", "en_US");

        let err = apply(&mut order, Transition::SelectPayment).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition { from: CheckoutState::Cart, transition: Transition::SelectPayment }
        ));
        assert_eq!(order.checkout_state, CheckoutState::Cart);

        assert!(apply(&mut order, Transition::SelectShipping).is_err());
        assert!(apply(&mut order, Transition::Complete).is_err());
    }

    #[test]
    fn test_cancel() {
        let mut order = Order::new_cart(1, "EUR", "en_US");
        apply(&mut order, Transition::Cancel).unwrap();
        assert!(apply(&mut order, Transition::Address).is_err());
        assert!(apply(&mut order, Transition::Cancel).is_err());
    }
}
