//! Integer value types for the storefront.
//!
//! All currency amounts and reward points are whole numbers. They are stored as `INTEGER` columns, so both types are
//! transparent `i64` wrappers as far as sqlx is concerned.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountConversionError {
    #[error("Amount {0} overflows the supported range")]
    Overflow(String),
    #[error("The point rate must be at least 1, but got {0}")]
    InvalidPointRate(i64),
}

//--------------------------------------        Money        ---------------------------------------------------------
/// A currency amount in the smallest unit the store prices in.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Money(i64);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Line total for `quantity` units at this unit price. Fails rather than wrapping on overflow.
    pub fn checked_mul(self, quantity: i64) -> Result<Self, AmountConversionError> {
        self.0
            .checked_mul(quantity)
            .map(Self)
            .ok_or_else(|| AmountConversionError::Overflow(format!("{} x {quantity}", self.0)))
    }
}

//--------------------------------------        Points       ---------------------------------------------------------
/// Loyalty points held by an account.
///
/// Additions are always checked. Use [`Points::checked_add`] or [`Points::checked_sum`].
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Points(i64);

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}pts", self.0)
    }
}

impl Points {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Points) -> Result<Self, AmountConversionError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| AmountConversionError::Overflow(format!("{} + {}", self.0, other.0)))
    }

    pub fn checked_sum<I: IntoIterator<Item = Points>>(iter: I) -> Result<Self, AmountConversionError> {
        iter.into_iter().try_fold(Self::default(), Points::checked_add)
    }

    /// For running totals that are only reported, never stored.
    pub fn saturating_add(self, other: Points) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

//--------------------------------------      PointRate      ---------------------------------------------------------
/// The currency-to-point conversion divisor. One point is earned for every whole `rate` units spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PointRate(i64);

impl PointRate {
    pub const DEFAULT: PointRate = PointRate(100_000);

    pub fn new(rate: i64) -> Result<Self, AmountConversionError> {
        if rate < 1 {
            return Err(AmountConversionError::InvalidPointRate(rate));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `floor(total / rate)`. Negative totals never earn points.
    pub fn points_for(&self, total: Money) -> Points {
        Points(total.value().max(0) / self.0)
    }
}

impl Default for PointRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for PointRate {
    type Error = AmountConversionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PointRate> for i64 {
    fn from(rate: PointRate) -> Self {
        rate.0
    }
}

impl Display for PointRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "1pt per {}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn points_are_floored() {
        let rate = PointRate::new(100_000).unwrap();
        assert_eq!(rate.points_for(Money::from(8_500_000)), Points::from(85));
        assert_eq!(rate.points_for(Money::from(17_000_000)), Points::from(170));
        assert_eq!(rate.points_for(Money::from(99_999)), Points::from(0));
        assert_eq!(rate.points_for(Money::from(150_000)), Points::from(1));
    }

    #[test]
    fn point_rate_must_be_positive() {
        assert_eq!(PointRate::new(0), Err(AmountConversionError::InvalidPointRate(0)));
        assert!(PointRate::new(-5).is_err());
        assert_eq!(PointRate::default().value(), 100_000);
    }

    #[test]
    fn line_totals() {
        let price = Money::from(8_500_000);
        assert_eq!(price.checked_mul(2).unwrap(), Money::from(17_000_000));
        assert!(Money::from(i64::MAX).checked_mul(2).is_err());
    }

    #[test]
    fn sums() {
        let total = Points::checked_sum([85, 170, 0].into_iter().map(Points::from)).unwrap();
        assert_eq!(total, Points::from(255));
        assert_eq!(format!("{total}"), "255pts");
        let half = Points::from(i64::MAX / 2 + 1);
        assert!(Points::checked_sum([half, half]).is_err());
        assert!(half.checked_add(Points::from(1)).is_ok());
        assert_eq!(half.saturating_add(half), Points::from(i64::MAX));
    }
}
