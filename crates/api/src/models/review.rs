//! Product review.
//!
//! Reviews point at a product by its name rather than its ID. The name is
//! lowercased on every write and lookup, so "Food" and "food" share one
//! bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, Resource};
use crate::validation::{Fields, ValidationErrors};

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Product name, lowercased.
    pub name: String,
    pub email: String,
    pub rating: u8,
    pub comment: String,
    /// Always the server time of the write.
    pub created_at: DateTime<Utc>,
}

/// Lookup key for a product name.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

impl Entity for Review {
    const COLLECTION: &'static str = "reviews";
    const NAME: &'static str = "review";
}

impl Resource for Review {
    fn from_input(input: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(input)?;

        let name = fields.required_text("name");
        let email = fields.required_text("email");
        let rating = fields
            .integer_in_range("rating", 1..=5)
            .and_then(|r| u8::try_from(r).ok());
        let comment = fields.required_text("comment");

        match (name, email, rating, comment) {
            (Some(name), Some(email), Some(rating), Some(comment)) => Ok(Self {
                name: normalize_name(&name),
                email,
                rating,
                comment,
                created_at: Utc::now(),
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
    fn test_name_is_lowercased() {
        let review = Review::from_input(&json!({
            "name": "Food",
            "email": "john@gmail.com",
            "rating": 5,
            "comment": "This is an awesome item",
        }))
        .unwrap();
        assert_eq!(review.name, "food");
        assert_eq!(review.rating, 5);
    }

    #[test]
    fn test_client_created_at_is_ignored() {
        let review = Review::from_input(&json!({
            "name": "Food",
            "email": "john@gmail.com",
            "rating": 3,
            "comment": "ok",
            "createdAt": "1999-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(review.created_at.timestamp() > 946_684_800);
    }

    #[test]
    fn test_reports_every_bad_field() {
        let errors = Review::from_input(&json!({"name": "Food", "rating": 9})).unwrap_err();
        assert_eq!(errors.fields(), vec!["email", "rating", "comment"]);
    }
}
