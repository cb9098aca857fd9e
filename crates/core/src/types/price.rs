//! Money in Indian rupees using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Rupees`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Amounts below zero are not prices.
    #[error("price cannot be negative")]
    Negative,
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// More than two decimal places.
    #[error("price can have at most two decimal places")]
    TooManyDecimals,
    /// Beyond what a stored price can hold.
    #[error("price cannot exceed 99,999,999.99")]
    TooLarge,
}

/// Decimal places kept by the `NUMERIC(10, 2)` money columns.
pub const MONEY_SCALE: u32 = 2;

/// A non-negative amount in rupees.
///
/// Catalog prices, cart lines, shipping fees and order totals all use this
/// type, so the `price >= 0` invariant is enforced once at construction.
///
/// ```
/// use halwa_core::Rupees;
///
/// let line = Rupees::from_whole(450) * 2;
/// assert_eq!(line.to_string(), "₹900");
/// assert_eq!((line + Rupees::from_whole(99_479)).to_string(), "₹1,00,379");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rupees(Decimal);

impl Rupees {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.normalize()))
    }

    /// Create an amount from a whole number of rupees.
    #[must_use]
    pub fn from_whole(rupees: u32) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Parse a user-entered amount such as `"450"` or `"380.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] or [`PriceError::Negative`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s.trim().parse().map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// Parse a price typed into a catalog form.
    ///
    /// Like [`Rupees::parse`], and also rejects amounts the money columns
    /// would round or overflow.
    ///
    /// # Errors
    ///
    /// Returns any [`PriceError`].
    pub fn parse_storable(s: &str) -> Result<Self, PriceError> {
        Self::parse(s)?.storable()
    }

    /// This amount, if it fits a `NUMERIC(10, 2)` column exactly.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::TooManyDecimals`] or [`PriceError::TooLarge`].
    pub fn storable(self) -> Result<Self, PriceError> {
        if self.0.scale() > MONEY_SCALE {
            return Err(PriceError::TooManyDecimals);
        }
        if self.0 > Self::max_storable().0 {
            return Err(PriceError::TooLarge);
        }
        Ok(self)
    }

    /// Largest amount a money column holds: `99,999,999.99`.
    #[must_use]
    pub fn max_storable() -> Self {
        Self(Decimal::new(9_999_999_999, MONEY_SCALE))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Plain number for form inputs, e.g. `1379` or `380.5`.
    #[must_use]
    pub fn to_input_value(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl TryFrom<Decimal> for Rupees {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rupees> for Decimal {
    fn from(value: Rupees) -> Self {
        value.0
    }
}

impl Add for Rupees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Rupees {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Rupees {
    /// Indian digit grouping: `₹1,379`, `₹12,34,567`, `₹380.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let whole = rounded.trunc();
        let paise = ((rounded - whole) * Decimal::ONE_HUNDRED).trunc().to_string();

        let digits = whole.to_string();
        write!(f, "₹{}", group_indian(&digits))?;
        if paise != "0" {
            write!(f, ".{paise:0>2}")?;
        }
        Ok(())
    }
}

/// Group an integer digit string as lakh/crore: last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rupees {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rupees {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rupees {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Rupees::new(Decimal::from(-1)), Err(PriceError::Negative));
        assert_eq!(Rupees::parse("-0.01"), Err(PriceError::Negative));
        assert_eq!(Rupees::parse("abc"), Err(PriceError::NotANumber));
        assert!(Rupees::parse("0").unwrap().is_zero());
    }

    #[test]
    fn test_storable_range_and_scale() {
        assert_eq!(
            Rupees::parse_storable("123456789012"),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Rupees::parse_storable("380.555"),
            Err(PriceError::TooManyDecimals)
        );
        assert_eq!(
            Rupees::parse_storable("99999999.99"),
            Ok(Rupees::max_storable())
        );
        assert_eq!(
            Rupees::parse_storable("380.500").unwrap(),
            Rupees::parse("380.5").unwrap()
        );
        assert_eq!(Rupees::parse_storable("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_display_groups_indian_style() {
        assert_eq!(Rupees::from_whole(0).to_string(), "₹0");
        assert_eq!(Rupees::from_whole(99).to_string(), "₹99");
        assert_eq!(Rupees::from_whole(1379).to_string(), "₹1,379");
        assert_eq!(Rupees::from_whole(123_456).to_string(), "₹1,23,456");
        assert_eq!(Rupees::from_whole(12_345_678).to_string(), "₹1,23,45,678");
    }

    #[test]
    fn test_display_shows_paise_when_fractional() {
        assert_eq!(Rupees::parse("380.5").unwrap().to_string(), "₹380.50");
        assert_eq!(Rupees::parse("1499.05").unwrap().to_string(), "₹1,499.05");
    }

    #[test]
    fn test_arithmetic() {
        let subtotal: Rupees = [Rupees::from_whole(450) * 2, Rupees::from_whole(380)]
            .into_iter()
            .sum();
        assert_eq!(subtotal, Rupees::from_whole(1280));
        assert!(subtotal < Rupees::from_whole(1499));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Rupees>("\"-5\"").is_err());
        assert_eq!(
            serde_json::from_str::<Rupees>("\"450\"").unwrap(),
            Rupees::from_whole(450)
        );
    }

    #[test]
    fn test_input_value_is_plain_number() {
        assert_eq!(Rupees::parse("380.50").unwrap().to_input_value(), "380.5");
        assert_eq!(Rupees::from_whole(1379).to_input_value(), "1379");
    }
}
