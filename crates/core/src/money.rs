use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// A signed rand amount. Positive is money in, negative is money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Saturates at the `i64` bounds for amounts too large to express in cents.
    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(if self.0.is_sign_negative() { i64::MIN } else { i64::MAX })
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Like [`Money::from_decimal`], but `None` unless the amount fits in
    /// `i64` cents.
    pub fn checked_from_decimal(decimal: Decimal) -> Option<Self> {
        let money = Money::from_decimal(decimal);
        money
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(|_| money)
    }

    /// `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Money::from_decimal)
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-R{:.2}", self.0.abs())
        } else {
            write!(f, "R{:.2}", self.0)
        }
    }
}

/// Saturates at the `Decimal` bounds instead of panicking.
impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_trip() {
        assert_eq!(Money::from_cents(124750).to_cents(), 124750);
        assert_eq!(Money::from_cents(-8950).to_cents(), -8950);
    }

    #[test]
    fn from_f64_rounds_to_two_places() {
        let m = Money::from_f64(12.345678).unwrap();
        assert_eq!(m.to_cents(), 1235);
        assert!(Money::from_f64(f64::NAN).is_none());
        assert!(Money::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn sign_helpers() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_negative());
        assert!(!Money::zero().is_positive());
        assert_eq!(Money::from_cents(-500).abs(), Money::from_cents(500));
    }

    #[test]
    fn display_uses_rand_symbol() {
        assert_eq!(Money::from_cents(124750).to_string(), "R1247.50");
        assert_eq!(Money::from_cents(-7550).to_string(), "-R75.50");
    }

    #[test]
    fn checked_from_decimal_bounds() {
        assert_eq!(
            Money::checked_from_decimal(Decimal::new(124750, 2)),
            Some(Money::from_cents(124750))
        );
        assert!(Money::checked_from_decimal(Decimal::MAX).is_none());
        assert!(Money::checked_from_decimal(Decimal::MIN).is_none());
        // i64::MAX cents is R92233720368547758.07
        assert!(Money::checked_from_decimal(Decimal::new(i64::MAX, 2)).is_some());
        assert!(Money::checked_from_decimal(Decimal::new(i64::MAX, 2) + Decimal::ONE).is_none());
    }

    #[test]
    fn arithmetic_saturates() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert_eq!(huge + huge, huge);
        assert_eq!(-huge - huge, -huge);
        let total: Money = [-huge, -huge, Money::from_cents(100)].into_iter().sum();
        assert!(total.is_negative());
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [Money::from_cents(100), Money::from_cents(-30)].iter().sum();
        assert_eq!(total.to_cents(), 70);
    }
}
