use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::money_amount::{MoneyAmount, MoneyAmountParseError};

/// ISO 4217 alphabetic currency code, e.g. `USD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyCode([u8; 3]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Currency code must be three uppercase ASCII letters, got {0:?}")]
pub struct CurrencyCodeError(pub String);

impl CurrencyCode {
    pub const USD: CurrencyCode = CurrencyCode(*b"USD");

    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII uppercase bytes.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(CurrencyCodeError(s.to_string()));
        }
        Ok(CurrencyCode([bytes[0], bytes[1], bytes[2]]))
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What the shopper is about to pay for.
///
/// Created once when the checkout page loads and shared read-only by both wallet
/// adapters for the lifetime of the checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub amount: MoneyAmount,
    pub currency: CurrencyCode,
    pub merchant_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentIntentError {
    #[error("Invalid amount: {0}")]
    Amount(#[from] MoneyAmountParseError),
    #[error(transparent)]
    Currency(#[from] CurrencyCodeError),
}

impl PaymentIntent {
    pub const DEFAULT_AMOUNT: &'static str = "1.00";
    pub const DEFAULT_MERCHANT_NAME: &'static str = "Example Store";

    pub fn try_new(
        amount: &str,
        currency: &str,
        merchant_name: impl Into<String>,
    ) -> Result<Self, PaymentIntentError> {
        Ok(Self {
            amount: amount.parse()?,
            currency: currency.parse()?,
            merchant_name: merchant_name.into(),
        })
    }
}

impl Default for PaymentIntent {
    /// One US dollar to the example store, which is what the demo page charges.
    fn default() -> Self {
        Self {
            amount: MoneyAmount::parse(Self::DEFAULT_AMOUNT).expect("valid default amount"),
            currency: CurrencyCode::USD,
            merchant_name: Self::DEFAULT_MERCHANT_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_intent_charges_one_dollar() {
        let intent = PaymentIntent::default();
        assert_eq!(intent.amount.as_wire_string(), "1.00");
        assert_eq!(intent.currency, CurrencyCode::USD);
        assert_eq!(intent.merchant_name, "Example Store");
    }

    #[test]
    fn currency_must_be_iso_shaped() {
        assert!("usd".parse::<CurrencyCode>().is_err());
        assert!("USDT".parse::<CurrencyCode>().is_err());
        assert_eq!("EUR".parse::<CurrencyCode>().unwrap().as_str(), "EUR");
    }

    #[test]
    fn intent_wire_format() {
        let intent = PaymentIntent::try_new("2.50", "EUR", "Shop").unwrap();
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": "2.50", "currency": "EUR", "merchantName": "Shop"})
        );
    }

    #[test]
    fn intent_rejects_malformed_amount() {
        for amount in ["1e5", "12abc34"] {
            assert!(matches!(
                PaymentIntent::try_new(amount, "USD", "Shop"),
                Err(PaymentIntentError::Amount(MoneyAmountParseError::InvalidFormat))
            ));
        }
    }
}
