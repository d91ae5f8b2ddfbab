use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

/// A validated postal address attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub country_code: String,
    pub city: String,
    pub postcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Address as submitted by a client. Every field may be absent; [`AddressInput::validate`]
/// turns it into an [`Address`] or records what is wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

fn required(
    value: &Option<String>,
    path: String,
    message: &str,
    errors: &mut ValidationErrors,
) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            errors.add(path, message);
            String::new()
        }
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AddressInput {
    /// Checks the required fields under `prefix` (e.g. `shipping_address`).
    ///
    /// Country existence is not checked here; it needs the country repository.
    /// The returned address carries an upper-cased country code.
    pub fn validate(&self, prefix: &str, errors: &mut ValidationErrors) -> Option<Address> {
        let before = errors.len();
        let path = |field: &str| format!("{}.{}", prefix, field);

        let first_name = required(&self.first_name, path("first_name"), "Please enter first name.", errors);
        let last_name = required(&self.last_name, path("last_name"), "Please enter last name.", errors);
        let street = required(&self.street, path("street"), "Please enter street.", errors);
        let country_code = required(&self.country_code, path("country_code"), "Please select country.", errors);
        let city = required(&self.city, path("city"), "Please enter city.", errors);
        let postcode = required(&self.postcode, path("postcode"), "Please enter postcode.", errors);

        if errors.len() > before {
            return None;
        }

        Some(Address {
            first_name,
            last_name,
            street,
            country_code: country_code.to_uppercase(),
            city,
            postcode,
            company: optional(&self.company),
            phone_number: optional(&self.phone_number),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bosch() -> AddressInput {
        AddressInput {
            first_name: Some("Hieronim".into()),
            last_name: Some("Bosch".into()),
            street: Some("Surrealism St.".into()),
            country_code: Some("nl".into()),
            city: Some("’s-Hertogenbosch".into()),
            postcode: Some("99-999".into()),
            company: Some("  ".into()),
            phone_number: None,
        }
    }

    #[test]
    fn test_valid_address() {
        let mut errors = ValidationErrors::new();
        let address = bosch().validate("shipping_address", &mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(address.country_code, "NL");
        assert_eq!(address.city, "’s-Hertogenbosch");
        assert_eq!(address.company, None);
    }

    #[test]
    fn test_missing_fields_are_reported_with_prefix() {
        let mut input = bosch();
        input.street = None;
        input.postcode = Some("   ".into());

        let mut errors = ValidationErrors::new();
        assert!(input.validate("billing_address", &mut errors).is_none());

        assert!(errors.contains("billing_address.street"));
        assert!(errors.contains("billing_address.postcode"));
        assert!(!errors.contains("billing_address.city"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_input_reports_all_required_fields() {
        let mut errors = ValidationErrors::new();
        assert!(AddressInput::default().validate("shipping_address", &mut errors).is_none());
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_existing_errors_do_not_block_valid_address() {
        let mut errors = ValidationErrors::single("customer.email", "Please enter your email.");
        assert!(bosch().validate("shipping_address", &mut errors).is_some());
    }
}
