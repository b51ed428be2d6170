//! Patterns used by the field recovery stage.
//!
//! String fields match `"name": "value"` and numeric fields match
//! `"name": 12.5`, anywhere in the text, whether or not the surrounding
//! JSON is well formed.

use lazy_static::lazy_static;
use regex::Regex;

fn string_field(name: &str) -> String {
    format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#, regex::escape(name))
}

fn number_field(name: &str) -> String {
    format!(r#""{}"\s*:\s*(-?\d+(?:\.\d+)?)"#, regex::escape(name))
}

fn array_start(name: &str) -> String {
    format!(r#""{}"\s*:\s*\["#, regex::escape(name))
}

lazy_static! {
    // Markdown code fences, with or without a language tag
    pub static ref CODE_FENCE: Regex = Regex::new(r"```(?:json)?\s*").unwrap();

    // Invoice header
    pub static ref VENDOR_NAME: Regex = Regex::new(&string_field("vendor_name")).unwrap();
    pub static ref INVOICE_NUMBER: Regex = Regex::new(&string_field("invoice_number")).unwrap();
    pub static ref INVOICE_DATE: Regex = Regex::new(&string_field("invoice_date")).unwrap();
    pub static ref DUE_DATE: Regex = Regex::new(&string_field("due_date")).unwrap();

    // Totals
    pub static ref SUBTOTAL: Regex = Regex::new(&number_field("subtotal")).unwrap();
    pub static ref TAX_RATE_PERCENT: Regex = Regex::new(&number_field("tax_rate_percent")).unwrap();
    pub static ref TAX_AMOUNT: Regex = Regex::new(&number_field("tax_amount")).unwrap();
    pub static ref DISCOUNT: Regex = Regex::new(&number_field("discount")).unwrap();
    pub static ref TOTAL_DUE: Regex = Regex::new(&number_field("total_due")).unwrap();

    // Line items
    pub static ref ITEMS_START: Regex = Regex::new(&array_start("items")).unwrap();
    pub static ref DETAILS_START: Regex = Regex::new(&array_start("details")).unwrap();
    pub static ref ITEM_DESCRIPTION: Regex = Regex::new(&string_field("description")).unwrap();
    pub static ref ITEM_CATEGORY: Regex = Regex::new(&string_field("category")).unwrap();
    pub static ref ITEM_QUANTITY: Regex = Regex::new(&number_field("quantity")).unwrap();
    pub static ref ITEM_UNIT_PRICE: Regex = Regex::new(&number_field("unit_price")).unwrap();
    pub static ref ITEM_TOTAL: Regex = Regex::new(&number_field("total")).unwrap();

    // Any JSON string literal
    pub static ref STRING_LITERAL: Regex = Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_field_pattern() {
        let caps = VENDOR_NAME.captures(r#"{"vendor_name" :  "Acme \"Best\" Co"}"#).unwrap();
        assert_eq!(&caps[1], r#"Acme \"Best\" Co"#);
    }

    #[test]
    fn test_number_field_pattern() {
        assert_eq!(&TOTAL_DUE.captures(r#""total_due": 79.18,"#).unwrap()[1], "79.18");
        assert_eq!(&DISCOUNT.captures(r#""discount":-5"#).unwrap()[1], "-5");
        assert!(TOTAL_DUE.captures(r#""total_due": "79.18""#).is_none());
    }

    #[test]
    fn test_item_total_does_not_match_longer_keys() {
        assert!(ITEM_TOTAL.captures(r#""subtotal": 10, "total_due": 11"#).is_none());
        assert_eq!(&ITEM_TOTAL.captures(r#""subtotal": 10, "total": 4"#).unwrap()[1], "4");
    }

    #[test]
    fn test_code_fence() {
        let stripped = CODE_FENCE.replace_all("```json\n{}\n```", "");
        assert_eq!(stripped, "{}\n");
    }
}
