use checkout_core::repository::CountryRepository;
use checkout_core::{Address, AddressInput, Email, EmailError, ValidationErrors};
use serde::{Deserialize, Serialize};

use crate::CheckoutResult;

pub const SHIPPING_ADDRESS: &str = "shipping_address";
pub const BILLING_ADDRESS: &str = "billing_address";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of an addressing request. Everything is optional at this level so that
/// missing sections surface as validation errors rather than parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressingRequest {
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub shipping_address: Option<AddressInput>,
    #[serde(default)]
    pub different_billing_address: bool,
    #[serde(default)]
    pub billing_address: Option<AddressInput>,
}

/// A fully validated addressing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressing {
    pub email: Email,
    pub shipping: Address,
    /// `Some` only when the client asked for a separate billing address.
    pub billing: Option<Address>,
}

impl AddressingRequest {
    /// Validates every section and checks country codes against `countries`.
    ///
    /// All violations are collected before returning, so one response names
    /// every problem with the request.
    pub async fn validate(&self, countries: &dyn CountryRepository) -> CheckoutResult<Addressing> {
        let mut errors = ValidationErrors::new();

        let email = self.validate_email(&mut errors);

        let shipping = match &self.shipping_address {
            Some(input) => input.validate(SHIPPING_ADDRESS, &mut errors),
            None => {
                errors.add(SHIPPING_ADDRESS, "Please provide a shipping address.");
                None
            }
        };

        let billing = if self.different_billing_address {
            match &self.billing_address {
                Some(input) => input.validate(BILLING_ADDRESS, &mut errors),
                None => {
                    errors.add(BILLING_ADDRESS, "Please provide a billing address.");
                    None
                }
            }
        } else {
            None
        };

        if let Some(address) = &shipping {
            check_country(countries, address, SHIPPING_ADDRESS, &mut errors).await?;
        }
        if let Some(address) = &billing {
            check_country(countries, address, BILLING_ADDRESS, &mut errors).await?;
        }

        match (email, shipping) {
            (Some(email), Some(shipping)) if errors.is_empty() => Ok(Addressing {
                email,
                shipping,
                billing,
            }),
            _ => Err(errors.into()),
        }
    }

    fn validate_email(&self, errors: &mut ValidationErrors) -> Option<Email> {
        let raw = self.customer.as_ref().and_then(|c| c.email.as_deref());
        match raw.map(Email::parse) {
            Some(Ok(email)) => Some(email),
            None | Some(Err(EmailError::Empty)) => {
                errors.add("customer.email", "Please enter your email.");
                None
            }
            Some(Err(e)) => {
                errors.add("customer.email", format!("This email is invalid: {}.", e));
                None
            }
        }
    }
}

async fn check_country(
    countries: &dyn CountryRepository,
    address: &Address,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> CheckoutResult<()> {
    let path = format!("{}.country_code", prefix);
    match countries.find_country(&address.country_code).await? {
        Some(country) if country.enabled => {}
        Some(_) => errors.add(path, "This country is not available."),
        None => errors.add(path, "This country does not exist."),
    }
    Ok(())
}
