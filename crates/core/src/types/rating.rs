//! Feedback star ratings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned for ratings outside 1..=5.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct RatingError(pub i32);

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: i32 = 1;
    /// Highest accepted rating.
    pub const MAX: i32 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] when `value` is outside 1..=5.
    pub fn new(value: i32) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(RatingError(value))
    }

    /// The numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Bucket used by the admin feedback board.
    #[must_use]
    pub const fn sentiment(self) -> Sentiment {
        match self.0 {
            4.. => Sentiment::Positive,
            3 => Sentiment::Neutral,
            _ => Sentiment::Negative,
        }
    }

    /// Filled and empty stars, e.g. `★★★☆☆`.
    #[must_use]
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i32::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&i16::from(self.0), buf)
    }
}

/// Feedback grouping by rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Four or five stars.
    Positive,
    /// Three stars.
    Neutral,
    /// One or two stars.
    Negative,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(0), Err(RatingError(0)));
        assert_eq!(Rating::new(6), Err(RatingError(6)));
        assert_eq!(Rating::new(-3), Err(RatingError(-3)));
    }

    #[test]
    fn test_sentiment_buckets() {
        let bucket = |v| Rating::new(v).unwrap().sentiment();
        assert_eq!(bucket(5), Sentiment::Positive);
        assert_eq!(bucket(4), Sentiment::Positive);
        assert_eq!(bucket(3), Sentiment::Neutral);
        assert_eq!(bucket(2), Sentiment::Negative);
        assert_eq!(bucket(1), Sentiment::Negative);
    }

    #[test]
    fn test_stars() {
        assert_eq!(Rating::new(3).unwrap().stars(), "★★★☆☆");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
