//! Monetary amounts using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more fractional digits than the currency allows.
    #[error("price can have at most {max} decimal places")]
    TooPrecise {
        /// Maximum number of fractional digits.
        max: u32,
    },
    /// The amount does not fit the `NUMERIC(10, 2)` column.
    #[error("price must be less than {limit}")]
    TooLarge {
        /// Smallest amount that is rejected.
        limit: u64,
    },
}

/// A price in the shop currency.
///
/// Stored as `NUMERIC(10, 2)`; always non-negative with at most two
/// fractional digits when built through [`Price::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Number of fractional digits kept for prices.
    pub const SCALE: u32 = 2;

    /// Prices must stay below this amount (eight integer digits).
    pub const LIMIT: u64 = 100_000_000;

    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap an already validated decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a user-entered price such as `"12.5"` or `"3"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a number, is negative, has
    /// more than two fractional digits or is not below [`Price::LIMIT`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }
        if amount >= Decimal::from(Self::LIMIT) {
            return Err(PriceError::TooLarge { limit: Self::LIMIT });
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
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
    fn test_parse_valid_prices() {
        assert_eq!(Price::parse("10").unwrap().to_string(), "10.00");
        assert_eq!(Price::parse(" 4.5 ").unwrap().to_string(), "4.50");
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
        assert_eq!(Price::parse("19.990").unwrap().to_string(), "19.99");
    }

    #[test]
    fn test_parse_invalid_prices() {
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse(""), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert_eq!(
            Price::parse("1.005"),
            Err(PriceError::TooPrecise { max: 2 })
        );
    }

    #[test]
    fn test_parse_rejects_amounts_too_large_for_the_column() {
        assert_eq!(
            Price::parse("99999999.99").unwrap().to_string(),
            "99999999.99"
        );
        assert_eq!(
            Price::parse("100000000"),
            Err(PriceError::TooLarge { limit: 100_000_000 })
        );
        assert_eq!(
            Price::parse("123456789012.00"),
            Err(PriceError::TooLarge { limit: 100_000_000 })
        );
    }

    #[test]
    fn test_times_and_sum() {
        let a = Price::parse("10").unwrap();
        let b = Price::parse("5").unwrap();
        let total: Price = [a.times(2), b.times(1)].into_iter().sum();
        assert_eq!(total, Price::parse("25").unwrap());
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total: Price = core::iter::empty().sum();
        assert_eq!(total, Price::ZERO);
    }
}
