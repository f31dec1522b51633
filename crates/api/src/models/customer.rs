//! Customer record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eko_store_core::{Email, PhoneNumber};

use super::{Entity, Resource};
use crate::validation::{Fields, ValidationErrors};

/// A store customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub created_at: DateTime<Utc>,
}

impl Entity for Customer {
    const COLLECTION: &'static str = "customers";
    const NAME: &'static str = "customer";
}

impl Resource for Customer {
    fn from_input(input: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(input)?;

        let first_name = fields.required_text("firstName");
        let last_name = fields.required_text("lastName");
        let address = fields.required_text("address");
        let email = fields.email("email");
        let phone_number = fields.digits("phoneNumber");
        let created_at = fields.timestamp("createdAt");

        match (first_name, last_name, address, email, phone_number, created_at) {
            (
                Some(first_name),
                Some(last_name),
                Some(address),
                Some(email),
                Some(phone_number),
                Some(created_at),
            ) => Ok(Self {
                first_name,
                last_name,
                address,
                email,
                phone_number,
                created_at,
            }),
            _ => Err(fields.into_errors()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_customer() {
        let input = json!({
            "firstName": "Ada",
            "lastName": "Obi",
            "address": "1 Marina Road",
            "email": "ada@example.com",
            "phoneNumber": "08012345678",
            "createdAt": "2025-04-13",
        });
        let customer = Customer::from_input(&input).unwrap();
        assert_eq!(customer.email.as_str(), "ada@example.com");
        assert_eq!(customer.phone_number.as_str(), "08012345678");

        let doc = customer.to_document().unwrap();
        assert!(doc.contains_key("firstName"));
        assert!(doc.contains_key("phoneNumber"));
    }

    #[test]
    fn test_reports_every_bad_field() {
        let input = json!({
            "firstName": "Ada",
            "email": "ada-at-example",
            "phoneNumber": "+234 801",
        });
        let errors = Customer::from_input(&input).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec!["lastName", "address", "email", "phoneNumber", "createdAt"]
        );
        let messages: Vec<_> = errors.violations().iter().map(|v| v.message.as_str()).collect();
        assert!(messages.contains(&"Email must be a valid email address"));
        assert!(messages.contains(&"Phone number must contain only digits"));
        assert!(messages.contains(&"Created at is required"));
    }
}
