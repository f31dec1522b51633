//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
    /// The amount is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
}

/// A strictly positive product price.
///
/// Stored as a [`Decimal`] so that `9.99` stays `9.99`. On the wire a price
/// is a JSON number; numeric strings are accepted on input.
///
/// ```
/// use eko_store_core::Price;
///
/// let price = Price::parse("9.99").unwrap();
/// assert_eq!(price.to_string(), "9.99");
/// assert!(Price::parse("0").is_err());
/// assert!(Price::parse("-1.50").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if the amount is zero or negative.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse a price from its decimal text form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a decimal or is not positive.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a positive decimal number")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        // `f64` Display yields the shortest text that round-trips, so 9.99
        // comes back as "9.99" rather than its binary expansion.
        Price::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        Price::parse(v).map_err(E::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive() {
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(Price::new(Decimal::from(-3)), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(Price::parse(" 12.50 ").unwrap().to_string(), "12.5");
        assert!(matches!(
            Price::parse("$9.99"),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::parse("9.99").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "9.99");
    }

    #[test]
    fn test_deserializes_number_and_string() {
        let from_number: Price = serde_json::from_str("9.99").unwrap();
        let from_string: Price = serde_json::from_str("\"9.99\"").unwrap();
        let from_int: Price = serde_json::from_str("5").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.to_string(), "9.99");
        assert_eq!(from_int.to_string(), "5");
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Price>("0").is_err());
        assert!(serde_json::from_str::<Price>("true").is_err());
    }
}
