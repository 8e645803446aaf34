use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::{Currency, EngineError};

/// Signed money amount represented as integer **minor units**.
///
/// Use this type for all monetary values crossing the engine boundary
/// (balances, budget amounts, transaction amounts) to avoid floating-point
/// drift.
///
/// The value is signed:
/// - positive = income / increase
/// - negative = expense / decrease
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.format(Currency::Eur), "12.34€");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more fraction digits than the currency carries):
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse_major("10", Currency::Eur).unwrap().minor(), 1000);
/// assert_eq!(Money::parse_major("10,5", Currency::Eur).unwrap().minor(), 1050);
/// assert!(Money::parse_major("12.345", Currency::Eur).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the magnitude of the amount.
    #[must_use]
    pub const fn abs(self) -> Money {
        Money(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Formats the amount in major units with the currency symbol.
    ///
    /// EUR renders the symbol as a suffix (`10.50€`), USD as a prefix
    /// (`$10.50`).
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = 10u64.pow(u32::from(currency.minor_units()));
        let major = abs / scale;
        let minor = abs % scale;
        let width = currency.minor_units() as usize;
        match currency {
            Currency::Eur => format!("{sign}{major}.{minor:0width$}{}", currency.symbol()),
            Currency::Usd => format!("{sign}{}{major}.{minor:0width$}", currency.symbol()),
        }
    }

    /// Parses a decimal string in major units into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fraction digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    pub fn parse_major(s: &str, currency: Currency) -> Result<Money, EngineError> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let major: i64 = major_str.parse().map_err(|_| invalid())?;

        let max_digits = usize::from(currency.minor_units());
        let minor: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > max_digits {
                    return Err(EngineError::InvalidAmount(
                        "too many decimals".to_string(),
                    ));
                }
                let parsed: i64 = frac.parse().map_err(|_| invalid())?;
                parsed * 10i64.pow((max_digits - frac.len()) as u32)
            }
        };

        let scale = 10i64.pow(max_digits as u32);
        let total = major
            .checked_mul(scale)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(overflow)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Money(signed))
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_eur() {
        assert_eq!(Money::new(0).format(Currency::Eur), "0.00€");
        assert_eq!(Money::new(1).format(Currency::Eur), "0.01€");
        assert_eq!(Money::new(10).format(Currency::Eur), "0.10€");
        assert_eq!(Money::new(1050).format(Currency::Eur), "10.50€");
        assert_eq!(Money::new(-1050).format(Currency::Eur), "-10.50€");
    }

    #[test]
    fn display_formats_usd() {
        assert_eq!(Money::new(1050).format(Currency::Usd), "$10.50");
        assert_eq!(Money::new(-99).format(Currency::Usd), "-$0.99");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(Money::parse_major("10", Currency::Eur).unwrap().minor(), 1000);
        assert_eq!(Money::parse_major("10.5", Currency::Eur).unwrap().minor(), 1050);
        assert_eq!(Money::parse_major("10,50", Currency::Eur).unwrap().minor(), 1050);
        assert_eq!(Money::parse_major("-0.01", Currency::Eur).unwrap().minor(), -1);
        assert_eq!(Money::parse_major("+1.00", Currency::Eur).unwrap().minor(), 100);
        assert_eq!(Money::parse_major("  2.30 ", Currency::Eur).unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!(Money::parse_major("12.345", Currency::Eur).is_err());
        assert!(Money::parse_major("0.001", Currency::Eur).is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Money::parse_major("", Currency::Eur).is_err());
        assert!(Money::parse_major("abc", Currency::Eur).is_err());
        assert!(Money::parse_major("1.2.3", Currency::Eur).is_err());
    }
}
