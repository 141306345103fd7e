use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

/// A non-negative menu price held to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Returns `None` for negative amounts.
    pub fn from_decimal(decimal: Decimal) -> Option<Self> {
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return None;
        }
        Some(Price(decimal.round_dp(2)))
    }

    pub fn from_pence(pence: i64) -> Option<Self> {
        Self::from_decimal(Decimal::new(pence, 2))
    }

    pub fn to_pence(self) -> Option<i64> {
        (self.0 * Decimal::from(100)).to_i64()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Price(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Render with a currency symbol prefix, e.g. `£8.50`.
    pub fn display_with(self, currency: &str) -> String {
        format!("{currency}{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dec = Decimal::from_str(s.trim()).map_err(|e| format!("Invalid price '{s}': {e}"))?;
        Price::from_decimal(dec).ok_or_else(|| format!("Negative price '{s}'"))
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
        Price(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;
    fn mul(self, quantity: u32) -> Self {
        Price(self.0 * Decimal::from(quantity))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let p: Price = "8.5".parse().unwrap();
        assert_eq!(p.to_string(), "8.50");
        assert_eq!(p.display_with("£"), "£8.50");
    }

    #[test]
    fn negative_rejected() {
        assert!("-1.00".parse::<Price>().is_err());
        assert!(Price::from_pence(-5).is_none());
        assert!(Price::from_pence(0).is_some());
    }

    #[test]
    fn rounds_to_two_places() {
        let p = Price::from_decimal(Decimal::new(12345, 3)).unwrap();
        assert_eq!(p.to_pence(), Some(1234));
    }

    #[test]
    fn multiply_and_sum() {
        let naan = Price::from_pence(200).unwrap();
        let biryani = Price::from_pence(850).unwrap();
        let total: Price = [naan * 3, biryani * 2].into_iter().sum();
        assert_eq!(total.to_pence(), Some(2300));
    }
}
