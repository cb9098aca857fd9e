//! Indian mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileError {
    /// The input is empty.
    #[error("phone number is required")]
    Empty,
    /// The input is not exactly ten digits.
    #[error("phone number must be exactly 10 digits")]
    NotTenDigits,
    /// The number does not start with 6, 7, 8 or 9.
    #[error("phone number must start with 6, 7, 8 or 9")]
    InvalidPrefix,
}

/// A 10-digit mobile number, stored without country code or separators.
///
/// Checkout accepts any ten digits ([`MobileNumber::parse`]). Registration,
/// profile edits and the contact form use the stricter Indian mobile rule
/// ([`MobileNumber::parse_indian`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Number of digits in a mobile number.
    pub const LENGTH: usize = 10;

    /// Parse exactly ten ASCII digits (surrounding whitespace is ignored).
    ///
    /// # Errors
    ///
    /// Returns [`MobileError::Empty`] or [`MobileError::NotTenDigits`].
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MobileError::Empty);
        }
        if s.len() != Self::LENGTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MobileError::NotTenDigits);
        }
        Ok(Self(s.to_owned()))
    }

    /// Parse a ten-digit number that starts with 6-9.
    ///
    /// # Errors
    ///
    /// Returns any [`MobileNumber::parse`] error, or [`MobileError::InvalidPrefix`].
    pub fn parse_indian(s: &str) -> Result<Self, MobileError> {
        let number = Self::parse(s)?;
        match number.0.as_bytes().first() {
            Some(b'6'..=b'9') => Ok(number),
            _ => Err(MobileError::InvalidPrefix),
        }
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_ten_digits() {
        assert_eq!(MobileNumber::parse("0441234567").unwrap().as_str(), "0441234567");
        assert_eq!(MobileNumber::parse(" 9876543210 ").unwrap().as_str(), "9876543210");
    }

    #[test]
    fn test_parse_rejects_wrong_length_or_symbols() {
        assert_eq!(MobileNumber::parse(""), Err(MobileError::Empty));
        assert_eq!(MobileNumber::parse("98765"), Err(MobileError::NotTenDigits));
        assert_eq!(MobileNumber::parse("98765432101"), Err(MobileError::NotTenDigits));
        assert_eq!(MobileNumber::parse("98765-4321"), Err(MobileError::NotTenDigits));
        assert_eq!(MobileNumber::parse("+919876543"), Err(MobileError::NotTenDigits));
    }

    #[test]
    fn test_parse_indian_prefix() {
        assert!(MobileNumber::parse_indian("6123456789").is_ok());
        assert!(MobileNumber::parse_indian("9876543210").is_ok());
        assert_eq!(
            MobileNumber::parse_indian("5123456789"),
            Err(MobileError::InvalidPrefix)
        );
        assert_eq!(
            MobileNumber::parse_indian("0441234567"),
            Err(MobileError::InvalidPrefix)
        );
    }
}
