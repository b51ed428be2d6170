//! Monetary amount parsing.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Parse a plain or scientific decimal literal such as `79.18` or `1.5e3`.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Deserialize an optional JSON number into a `Decimal`.
///
/// Strings are rejected, so `"12.50"` is a type mismatch like any other.
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;

    number
        .map(|n| {
            parse_amount(&n.to_string()).ok_or_else(|| {
                serde::de::Error::custom(format!("amount out of range: {}", n))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("79.18"), Some(Decimal::new(7918, 2)));
        assert_eq!(parse_amount(" 110 "), Some(Decimal::from(110)));
        assert_eq!(parse_amount("-5.5"), Some(Decimal::new(-55, 1)));
        assert_eq!(parse_amount("1.5e3"), Some(Decimal::from(1500)));
        assert_eq!(parse_amount("abc"), None);
    }

    #[derive(Deserialize)]
    struct Amount {
        #[serde(default, deserialize_with = "deserialize_amount")]
        value: Option<Decimal>,
    }

    #[test]
    fn test_deserialize_amount() {
        let parsed: Amount = serde_json::from_str(r#"{"value": 79.18}"#).unwrap();
        assert_eq!(parsed.value, Some(Decimal::new(7918, 2)));

        let parsed: Amount = serde_json::from_str(r#"{"value": 3}"#).unwrap();
        assert_eq!(parsed.value, Some(Decimal::from(3)));

        let parsed: Amount = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(parsed.value, None);

        let parsed: Amount = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.value, None);

        assert!(serde_json::from_str::<Amount>(r#"{"value": "79.18"}"#).is_err());
    }
}
