//! Regex-backed extractors for single JSON-ish fields.

use regex::Regex;
use rust_decimal::Decimal;

use super::FieldExtractor;
use super::amounts::parse_amount;

/// A quoted string value. Escapes are decoded; empty values are skipped.
pub struct StringField(pub &'static Regex);

/// A bare numeric value.
pub struct AmountField(pub &'static Regex);

/// Every string literal in a fragment, in order.
pub struct StringList(pub &'static Regex);

/// Decode JSON escapes in a captured string body, keeping the raw text if
/// the escapes are malformed.
fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}

impl FieldExtractor for StringField {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        self.0
            .captures_iter(text)
            .map(|caps| unescape(&caps[1]))
            .filter(|value| !value.trim().is_empty())
            .collect()
    }
}

impl FieldExtractor for AmountField {
    type Output = Decimal;

    fn extract(&self, text: &str) -> Option<Decimal> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Decimal> {
        self.0
            .captures_iter(text)
            .filter_map(|caps| parse_amount(&caps[1]))
            .collect()
    }
}

impl FieldExtractor for StringList {
    type Output = String;

    fn extract(&self, text: &str) -> Option<String> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<String> {
        self.0
            .captures_iter(text)
            .map(|caps| unescape(&caps[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::patterns::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_field() {
        let text = r#"{"vendor_name": "", "vendor_name": "Café \"Nine\""}"#;
        assert_eq!(
            StringField(&VENDOR_NAME).extract(text),
            Some("Café \"Nine\"".to_string())
        );
        assert_eq!(StringField(&INVOICE_NUMBER).extract(text), None);
    }

    #[test]
    fn test_amount_field() {
        let text = r#""subtotal": 100, "subtotal": 12.5"#;
        assert_eq!(
            AmountField(&SUBTOTAL).extract_all(text),
            vec![Decimal::from(100), Decimal::new(125, 1)]
        );
    }

    #[test]
    fn test_string_list() {
        let text = r#""Room 12", "2 nights \\ breakfast""#;
        assert_eq!(
            StringList(&STRING_LITERAL).extract_all(text),
            vec!["Room 12".to_string(), "2 nights \\ breakfast".to_string()]
        );
    }
}
