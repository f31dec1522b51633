//! Product catalogue entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eko_store_core::Price;

use super::{Entity, Resource};
use crate::validation::{Fields, ValidationErrors};

/// A product offered in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u64,
    pub category: String,
    pub image_url: String,
    /// Defaults to the time of creation when the client omits it; a
    /// replacement without it keeps the stored value.
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const NAME: &'static str = "product";
}

impl Resource for Product {
    fn from_input(input: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new(input)?;

        let name = fields.required_text("name");
        let description = fields.required_text("description");
        let price = fields.positive_decimal("price");
        let stock = fields.non_negative_integer("stock");
        let category = fields.required_text("category");
        let image_url = fields.uri("imageUrl");
        let created_at = fields.optional_timestamp("createdAt");

        match (name, description, price, stock, category, image_url) {
            (
                Some(name),
                Some(description),
                Some(price),
                Some(stock),
                Some(category),
                Some(image_url),
            ) if fields.is_clean() => Ok(Self {
                name,
                description,
                price,
                stock,
                category,
                image_url,
                created_at: created_at.unwrap_or_else(Utc::now),
            }),
            _ => Err(fields.into_errors()),
        }
    }

    fn retain_from(&mut self, previous: &Self, input: &Value) {
        if input.get("createdAt").is_none_or(Value::is_null) {
            self.created_at = previous.created_at;
        }
    }
}
