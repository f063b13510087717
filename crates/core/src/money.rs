use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signed bolívar amount rounded to two decimals. Positive is a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Converts a spreadsheet float. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self::from_decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bs {:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid amount: '{0}'")]
pub struct AmountError(pub String);

/// Separators used when amounts arrive as formatted text instead of numbers.
///
/// Passed explicitly to every parse call; there is no process-wide locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for NumberFormat {
    /// `es_VE`: `1.234,56`
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
        }
    }
}

fn re_currency() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)^bs\.?\s*|\s*bs\.?$").expect("invalid regex"))
}

impl NumberFormat {
    pub fn new(decimal_separator: char, grouping_separator: char) -> Self {
        Self {
            decimal_separator,
            grouping_separator,
        }
    }

    /// Parses locale-formatted text such as `1.234,56`, `-40,00`, `Bs. 12,50`
    /// or `(75,25)`.
    pub fn parse(&self, text: &str) -> Result<Money, AmountError> {
        let trimmed = text.trim();
        let stripped = re_currency().replace_all(trimmed, "");
        let stripped = stripped.trim();

        let (negative, body) = match stripped.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            Some(inner) => (true, inner.trim()),
            None => (false, stripped),
        };

        let normalized: String = body
            .chars()
            .filter(|c| *c != self.grouping_separator && !c.is_whitespace())
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();

        if normalized.is_empty() {
            return Err(AmountError(text.to_string()));
        }

        let decimal =
            Decimal::from_str(&normalized).map_err(|_| AmountError(text.to_string()))?;
        let money = Money::from_decimal(decimal);
        Ok(if negative { -money } else { money })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ve() -> NumberFormat {
        NumberFormat::default()
    }

    // ── NumberFormat::parse ───────────────────────────────────────────────────

    #[test]
    fn parse_grouped_amount() {
        assert_eq!(ve().parse("1.234,56").unwrap(), Money::from_cents(123456));
    }

    #[test]
    fn parse_plain_comma_decimal() {
        assert_eq!(ve().parse("40,00").unwrap(), Money::from_cents(4000));
    }

    #[test]
    fn parse_negative() {
        assert_eq!(ve().parse("-5,25").unwrap(), Money::from_cents(-525));
    }

    #[test]
    fn parse_accounting_parens() {
        assert_eq!(ve().parse("(75,25)").unwrap(), Money::from_cents(-7525));
    }

    #[test]
    fn parse_strips_currency_marker() {
        assert_eq!(ve().parse("Bs. 12,50").unwrap(), Money::from_cents(1250));
        assert_eq!(ve().parse("12,50 BS").unwrap(), Money::from_cents(1250));
    }

    #[test]
    fn parse_whole_number() {
        assert_eq!(ve().parse(" 100 ").unwrap(), Money::from_cents(10000));
    }

    #[test]
    fn parse_with_dot_decimal_format() {
        let us = NumberFormat::new('.', ',');
        assert_eq!(us.parse("1,234.56").unwrap(), Money::from_cents(123456));
    }

    #[test]
    fn parse_invalid() {
        assert!(ve().parse("Monto").is_err());
        assert!(ve().parse("").is_err());
        assert!(ve().parse("Bs.").is_err());
    }

    // ── Money ─────────────────────────────────────────────────────────────────

    #[test]
    fn from_f64_rounds_to_cents() {
        assert_eq!(Money::from_f64(10.005_f64 + 0.001).unwrap(), Money::from_cents(1001));
        assert!(Money::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn sign_helpers() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_cents(-1).is_positive());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn arithmetic() {
        let credit = Money::from_cents(10000);
        let debit = Money::from_cents(4000);
        assert_eq!(credit - debit, Money::from_cents(6000));
        assert_eq!(Money::zero() - debit, Money::from_cents(-4000));
        assert_eq!(credit + debit, Money::from_cents(14000));
    }

    #[test]
    fn display() {
        assert_eq!(Money::from_cents(123456).to_string(), "Bs 1234.56");
    }
}
