//! Digits-only phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than ASCII digits.
    #[error("phone number must contain only digits")]
    NonDigit,
}

/// A phone number stored exactly as submitted, restricted to ASCII digits.
///
/// No country-code or length rules are applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains a non-digit.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::NonDigit);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        assert!(PhoneNumber::parse("08012345678").is_ok());
    }

    #[test]
    fn test_parse_rejects_formatting() {
        assert_eq!(
            PhoneNumber::parse("+1 555-0100"),
            Err(PhoneNumberError::NonDigit)
        );
        assert_eq!(PhoneNumber::parse("555o100"), Err(PhoneNumberError::NonDigit));
        assert_eq!(PhoneNumber::parse(""), Err(PhoneNumberError::Empty));
    }

    #[test]
    fn test_parse_rejects_non_ascii_digits() {
        // Arabic-Indic digits are numeric but not ASCII
        assert_eq!(PhoneNumber::parse("٠١٢"), Err(PhoneNumberError::NonDigit));
    }
}
