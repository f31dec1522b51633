//! Input validation for resource writes.
//!
//! A [`Fields`] reader walks an untyped JSON body and records one
//! [`FieldViolation`] per bad field instead of stopping at the first, so a
//! single 400 response can list every problem. Each accessor returns
//! `Some(value)` only when the field passed; a `None` from a required
//! accessor always comes with a recorded violation.

use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use eko_store_core::{Email, PhoneNumber, Price};

use crate::db::Document;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Name of the offending field, as it appears in the request body.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

/// Every violation found in one input record, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", summarize(.0))]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// A result with exactly one violation.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldViolation {
            field: field.to_owned(),
            message: message.into(),
        }])
    }

    /// The individual violations.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Names of the rejected fields.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.field.as_str()).collect()
    }

    /// Whether `field` was rejected.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

/// Collecting reader over one JSON object.
pub struct Fields<'a> {
    input: &'a Document,
    violations: Vec<FieldViolation>,
}

impl<'a> Fields<'a> {
    /// Start reading `input`.
    ///
    /// # Errors
    ///
    /// Returns a single `body` violation if the input is not a JSON object.
    pub fn new(input: &'a Value) -> Result<Self, ValidationErrors> {
        match input {
            Value::Object(map) => Ok(Self {
                input: map,
                violations: Vec::new(),
            }),
            _ => Err(ValidationErrors::single(
                "body",
                "request body must be a JSON object",
            )),
        }
    }

    fn violate(&mut self, field: &str, problem: &str) {
        self.violations.push(FieldViolation {
            field: field.to_owned(),
            message: format!("{} {problem}", label(field)),
        });
    }

    /// `null` counts as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.input.get(field).filter(|v| !v.is_null())
    }

    /// A present, non-blank string.
    pub fn required_text(&mut self, field: &str) -> Option<String> {
        match self.get(field) {
            None => {
                self.violate(field, "is required");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.violate(field, "is required");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.violate(field, "must be a string");
                None
            }
        }
    }

    /// A required, well-formed email address.
    pub fn email(&mut self, field: &str) -> Option<Email> {
        let text = self.required_text(field)?;
        match Email::parse(&text) {
            Ok(email) => Some(email),
            Err(_) => {
                self.violate(field, "must be a valid email address");
                None
            }
        }
    }

    /// A required absolute URI.
    pub fn uri(&mut self, field: &str) -> Option<String> {
        let text = self.required_text(field)?;
        match url::Url::parse(&text) {
            Ok(_) => Some(text),
            Err(_) => {
                self.violate(field, "must be a valid URI");
                None
            }
        }
    }

    /// A required digits-only string.
    pub fn digits(&mut self, field: &str) -> Option<PhoneNumber> {
        let text = self.required_text(field)?;
        match PhoneNumber::parse(&text) {
            Ok(phone) => Some(phone),
            Err(_) => {
                self.violate(field, "must contain only digits");
                None
            }
        }
    }

    /// A required decimal greater than zero, given as a number or numeric string.
    pub fn positive_decimal(&mut self, field: &str) -> Option<Price> {
        let parsed = match self.get(field) {
            None => {
                self.violate(field, "is required");
                return None;
            }
            Some(Value::Number(n)) => Price::parse(&n.to_string()),
            Some(Value::String(s)) => Price::parse(s),
            Some(_) => {
                self.violate(field, "must be a number");
                return None;
            }
        };
        match parsed {
            Ok(price) => Some(price),
            Err(_) => {
                self.violate(field, "must be a positive number");
                None
            }
        }
    }

    /// A required JSON integer that is zero or greater.
    pub fn non_negative_integer(&mut self, field: &str) -> Option<u64> {
        match self.get(field) {
            None => {
                self.violate(field, "is required");
                None
            }
            Some(Value::Number(n)) => {
                if let Some(value) = n.as_u64() {
                    Some(value)
                } else {
                    self.violate(field, "must be a non-negative integer");
                    None
                }
            }
            Some(_) => {
                self.violate(field, "must be a non-negative integer");
                None
            }
        }
    }

    /// A required JSON integer within `range`.
    pub fn integer_in_range(&mut self, field: &str, range: RangeInclusive<i64>) -> Option<i64> {
        let message = format!(
            "must be an integer between {} and {}",
            range.start(),
            range.end()
        );
        match self.get(field) {
            None => {
                self.violate(field, "is required");
                None
            }
            Some(Value::Number(n)) => match n.as_i64() {
                Some(value) if range.contains(&value) => Some(value),
                _ => {
                    self.violate(field, &message);
                    None
                }
            },
            Some(_) => {
                self.violate(field, &message);
                None
            }
        }
    }

    /// A required date or date-time.
    pub fn timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        if self.get(field).is_none() {
            self.violate(field, "is required");
            return None;
        }
        self.optional_timestamp(field)
    }

    /// An optional date or date-time; absent yields `None` without a violation.
    pub fn optional_timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        let value = self.get(field)?;
        let parsed = value.as_str().and_then(parse_timestamp);
        if parsed.is_none() {
            self.violate(field, "must be a valid date");
        }
        parsed
    }

    /// Whether no violation has been recorded so far.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consume the reader and return what was collected.
    #[must_use]
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.violations)
    }
}

/// Human-readable name of a wire field: `phoneNumber` becomes `Phone number`.
fn label(field: &str) -> String {
    let mut label = String::with_capacity(field.len() + 2);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.extend(c.to_lowercase());
        } else {
            label.push(c);
        }
    }
    label.replace(" url", " URL")
}

/// Parse RFC 3339 date-times, or plain `YYYY-MM-DD` dates as midnight UTC.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
