//! Prices and stock values as whole cents.
//!
//! ```text
//!  "2,50" ──FromStr──► Money(250) ──× 12 units──► Money(3000) ──► "R$ 30.00"
//!                          │
//!                          └─ adjust_by_percent(10.0) ──► Money(275)
//! ```
//!
//! Every amount in a price list, balance or stock-value total is an `i64`
//! count of cents, so summing thousands of products never drifts. A float
//! appears only inside [`Money::adjust_by_percent`] and is rounded back to
//! cents before it leaves the function.
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price: Money = "2.50".parse().unwrap();
//! assert_eq!((price * 3).cents(), 750);
//! assert_eq!(price.adjust_by_percent(10.0).cents(), 275);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

const CENTS_PER_UNIT: i64 = 100;

// =============================================================================
// Money
// =============================================================================

/// An amount of the configured currency, in cents.
///
/// Signed: a product whose stock went negative has a negative stock value.
/// Serializes as the bare integer, matching the `preco_unitario` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Value of `quantity` units at this unit price.
    #[inline]
    pub const fn multiply_quantity(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }

    /// Raises (or for a negative `percent`, lowers) the amount by `percent`
    /// and rounds half away from zero to whole cents.
    ///
    /// The product store runs the same formula in SQL,
    /// `ROUND(preco_unitario * (1 + ?1 / 100.0))`, so a value computed here
    /// equals the one a bulk adjustment stores.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(999).adjust_by_percent(-50.0).cents(), 500);
    /// ```
    pub fn adjust_by_percent(&self, percent: f64) -> Money {
        let scaled = self.0 as f64 * (1.0 + percent / 100.0);
        Money(scaled.round() as i64)
    }

    /// `R$ 10.99` style text for reports; an empty symbol gives the bare
    /// amount.
    pub fn with_symbol(&self, symbol: &str) -> String {
        match symbol {
            "" => self.to_string(),
            symbol => format!("{} {}", symbol, self),
        }
    }
}

/// Two decimal places, no symbol. Honors width and alignment, which the
/// report columns rely on.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_unit = CENTS_PER_UNIT as u64;
        f.pad(&format!("{}{}.{:02}", sign, abs / per_unit, abs % per_unit))
    }
}

/// Parses a decimal amount such as `2.5`, `2.50` or `-10`.
///
/// No floating point is involved: the integer and fractional parts are
/// read separately. More than two fractional digits is rejected.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once(['.', ',']) {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a decimal number"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount too large"))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => frac.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = whole
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, quantity: i64) -> Self {
        self.multiply_quantity(quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_cents() {
        assert_eq!(serde_json::to_string(&Money::from_cents(1099)).unwrap(), "1099");
        let back: Money = serde_json::from_str("-550").unwrap();
        assert_eq!(back, Money::from_cents(-550));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(format!("{:>8}", Money::from_cents(250)), "    2.50");
    }

    #[test]
    fn test_with_symbol() {
        assert_eq!(Money::from_cents(250).with_symbol("R$"), "R$ 2.50");
        assert_eq!(Money::from_cents(250).with_symbol(""), "2.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!("2.50".parse::<Money>().unwrap().cents(), 250);
        assert_eq!("2.5".parse::<Money>().unwrap().cents(), 250);
        assert_eq!("2,5".parse::<Money>().unwrap().cents(), 250);
        assert_eq!("100".parse::<Money>().unwrap().cents(), 10000);
        assert_eq!(".99".parse::<Money>().unwrap().cents(), 99);
        assert_eq!("-10.05".parse::<Money>().unwrap().cents(), -1005);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_adjust_by_percent() {
        assert_eq!(Money::from_cents(10000).adjust_by_percent(10.0).cents(), 11000);
        assert_eq!(Money::from_cents(5000).adjust_by_percent(10.0).cents(), 5500);
        assert_eq!(Money::from_cents(1000).adjust_by_percent(-25.0).cents(), 750);
        // 3.33 * 1.15 = 3.8295 → 3.83
        assert_eq!(Money::from_cents(333).adjust_by_percent(15.0).cents(), 383);
    }

    #[test]
    fn test_negative_stock_value() {
        let value = Money::from_cents(250).multiply_quantity(-4);
        assert!(value.is_negative());
        assert_eq!(value.with_symbol("R$"), "R$ -10.00");
        assert_eq!(Money::default(), Money::zero());
    }
}
