//! Human-readable currency amount parsing.
//!
//! [`MoneyAmount`] turns strings such as `"1.00"` or `"$1,000.50"` into a
//! precise [`Decimal`]. The wallet SDKs expect the amount back as a string
//! with the original precision, so [`MoneyAmount::as_wire_string`] keeps
//! trailing zeros while [`Display`] normalizes them away.
//!
//! ```rust
//! use checkout_types::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("$10.50").unwrap();
//! assert_eq!(amount.scale(), 2);
//! assert_eq!(amount.as_wire_string(), "10.50");
//! ```

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

/// A parsed, non-negative monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoneyAmount(Decimal);

/// Errors that can occur when parsing a monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyAmountParseError {
    #[error("Invalid number format")]
    InvalidFormat,
    #[error(
        "Amount must be between {} and {}",
        constants::MIN_STR,
        constants::MAX_STR
    )]
    OutOfRange,
    #[error("Negative value is not allowed")]
    Negative,
}

mod constants {
    use super::*;

    pub const MIN_STR: &str = "0.01";
    pub const MAX_STR: &str = "999999999";

    pub static MIN: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MIN_STR).expect("valid decimal"));
    pub static MAX: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MAX_STR).expect("valid decimal"));
}

/// Currency symbols, thousand separators and whitespace. Anything else stays
/// in place and has to parse as a decimal.
static DECORATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Sc}\s,]+").expect("valid regex"));

impl MoneyAmount {
    /// Parses a human-readable currency string.
    ///
    /// Currency symbols, thousand separators and whitespace are stripped
    /// before parsing. The result must be non-negative and within range.
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        let cleaned = DECORATIONS.replace_all(input, "");
        let parsed =
            Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;
        if parsed.is_sign_negative() {
            return Err(MoneyAmountParseError::Negative);
        }
        if parsed < *constants::MIN || parsed > *constants::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }
        Ok(MoneyAmount(parsed))
    }

    /// Number of decimal places in the original input.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The amount as the wallet SDKs want it: a decimal string that keeps the input precision.
    pub fn as_wire_string(&self) -> String {
        self.0.to_string()
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoneyAmount::parse(s)
    }
}

impl TryFrom<&str> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MoneyAmount::from_str(value)
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for MoneyAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_wire_string())
    }
}

impl<'de> Deserialize<'de> for MoneyAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MoneyAmount::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_precision_on_the_wire() {
        let amount = MoneyAmount::parse("1.00").unwrap();
        assert_eq!(amount.as_wire_string(), "1.00");
        assert_eq!(amount.to_string(), "1");
    }

    #[test]
    fn strips_symbols_and_separators() {
        let amount = MoneyAmount::parse("$1,000.50").unwrap();
        assert_eq!(amount.as_wire_string(), "1000.50");
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert_eq!(
            MoneyAmount::parse("-1.00"),
            Err(MoneyAmountParseError::Negative)
        );
        assert_eq!(
            MoneyAmount::parse("abc"),
            Err(MoneyAmountParseError::InvalidFormat)
        );
        assert_eq!(
            MoneyAmount::parse("0.001"),
            Err(MoneyAmountParseError::OutOfRange)
        );
    }

    #[test]
    fn rejects_letters_inside_numbers() {
        for input in ["1e5", "12abc34", "1.2.3", "10 USD"] {
            assert_eq!(
                MoneyAmount::parse(input),
                Err(MoneyAmountParseError::InvalidFormat),
                "{input}"
            );
        }
    }

    #[test]
    fn strips_other_currency_symbols() {
        assert_eq!(MoneyAmount::parse("€ 12.50").unwrap().as_wire_string(), "12.50");
        assert_eq!(MoneyAmount::parse(" 7 ").unwrap().as_wire_string(), "7");
    }

    #[test]
    fn serializes_as_string() {
        let amount = MoneyAmount::parse("12.30").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"12.30\"");
        let back: MoneyAmount = serde_json::from_str("\"12.30\"").unwrap();
        assert_eq!(back, amount);
    }
}
