//! Serde shape of the canonical invoice JSON.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use super::assemble::{InvoiceDraft, ItemDraft};
use super::rules::amounts::deserialize_amount;
use super::rules::dates::parse_date;

/// Invoice object as the model is asked to produce it.
///
/// Every field is optional; wrong types are decode errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct InvoicePayload {
    vendor_name: Option<String>,
    invoice_number: Option<String>,
    invoice_date: Option<String>,
    due_date: Option<String>,
    items: Option<Vec<ItemPayload>>,
    #[serde(deserialize_with = "deserialize_amount")]
    subtotal: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_amount")]
    tax_rate_percent: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_amount")]
    tax_amount: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_amount")]
    discount: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_amount")]
    total_due: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ItemPayload {
    description: Option<String>,
    details: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_amount")]
    quantity: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_amount")]
    unit_price: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_amount")]
    total: Option<Decimal>,
    category: Option<String>,
}

/// Parse a date field, recording a warning when it is present but unreadable.
pub(crate) fn date_field(
    field: &str,
    value: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<chrono::NaiveDate> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = parse_date(value);
    if parsed.is_none() {
        warn!("Ignoring unrecognized {} {:?}", field, value);
        warnings.push(format!("{}: unrecognized date {:?}", field, value));
    }
    parsed
}

impl InvoicePayload {
    pub(crate) fn into_draft(self) -> InvoiceDraft {
        let mut warnings = Vec::new();
        let invoice_date = date_field("invoice_date", self.invoice_date.as_deref(), &mut warnings);
        let due_date = date_field("due_date", self.due_date.as_deref(), &mut warnings);

        InvoiceDraft {
            vendor_name: self.vendor_name,
            invoice_number: self.invoice_number,
            invoice_date,
            due_date,
            items: self
                .items
                .unwrap_or_default()
                .into_iter()
                .map(ItemPayload::into_draft)
                .collect(),
            subtotal: self.subtotal,
            tax_rate_percent: self.tax_rate_percent,
            tax_amount: self.tax_amount,
            discount: self.discount,
            total_due: self.total_due,
            warnings,
        }
    }
}

impl ItemPayload {
    fn into_draft(self) -> ItemDraft {
        ItemDraft {
            description: self.description,
            details: self.details.unwrap_or_default(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total: self.total,
            category: self.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_into_draft() {
        let payload: InvoicePayload = serde_json::from_str(
            r#"{
                "vendor_name": "Acme",
                "invoice_date": "2024-05-01T00:00:00Z",
                "due_date": "next week",
                "items": [{"description": "Widget", "details": null, "quantity": 2}],
                "total_due": 12.5,
                "notes": "ignored"
            }"#,
        )
        .unwrap();

        let draft = payload.into_draft();
        assert_eq!(draft.vendor_name.as_deref(), Some("Acme"));
        assert_eq!(draft.invoice_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(draft.due_date, None);
        assert_eq!(draft.warnings, vec!["due_date: unrecognized date \"next week\"".to_string()]);
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].quantity, Some(Decimal::from(2)));
        assert!(draft.items[0].details.is_empty());
        assert_eq!(draft.total_due, Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        assert!(serde_json::from_str::<InvoicePayload>(r#"{"vendor_name": 42}"#).is_err());
        assert!(serde_json::from_str::<InvoicePayload>(r#"{"items": [{"quantity": "2"}]}"#).is_err());
        assert!(serde_json::from_str::<InvoicePayload>(r#"{"items": {"description": "x"}}"#).is_err());
    }

    #[test]
    fn test_empty_date_is_silent() {
        let mut warnings = Vec::new();
        assert_eq!(date_field("due_date", Some("  "), &mut warnings), None);
        assert!(warnings.is_empty());
    }
}
