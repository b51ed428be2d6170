use tracing::warn;

use super::StageError;
use crate::extraction::assemble::{InvoiceDraft, ItemDraft};
use crate::extraction::rules::dates::parse_iso_date;
use crate::extraction::rules::patterns::*;
use crate::extraction::rules::scan::{array_body, object_spans};
use crate::extraction::rules::{AmountField, FieldExtractor, StringField, StringList};

/// Recover each field on its own from text that is not valid JSON.
///
/// Never fails by itself; an empty draft is rejected during assembly.
pub(crate) fn recover_fields(text: &str) -> Result<InvoiceDraft, StageError> {
    let mut warnings = Vec::new();

    let invoice_date = recover_date(text, "invoice_date", &INVOICE_DATE, &mut warnings);
    let due_date = recover_date(text, "due_date", &DUE_DATE, &mut warnings);

    Ok(InvoiceDraft {
        vendor_name: StringField(&VENDOR_NAME).extract(text),
        invoice_number: StringField(&INVOICE_NUMBER).extract(text),
        invoice_date,
        due_date,
        items: recover_items(text),
        subtotal: AmountField(&SUBTOTAL).extract(text),
        tax_rate_percent: AmountField(&TAX_RATE_PERCENT).extract(text),
        tax_amount: AmountField(&TAX_AMOUNT).extract(text),
        discount: AmountField(&DISCOUNT).extract(text),
        total_due: AmountField(&TOTAL_DUE).extract(text),
        warnings,
    })
}

fn recover_date(
    text: &str,
    field: &str,
    pattern: &'static regex::Regex,
    warnings: &mut Vec<String>,
) -> Option<chrono::NaiveDate> {
    let raw = StringField(pattern).extract(text)?;
    let parsed = parse_iso_date(&raw);
    if parsed.is_none() {
        warn!("Ignoring unrecognized {} {:?}", field, raw);
        warnings.push(format!("{}: unrecognized date {:?}", field, raw));
    }
    parsed
}

fn recover_items(text: &str) -> Vec<ItemDraft> {
    let Some(start) = ITEMS_START.find(text) else {
        return Vec::new();
    };

    object_spans(array_body(text, start.end()))
        .into_iter()
        .map(recover_item)
        .collect()
}

fn recover_item(object: &str) -> ItemDraft {
    let details = DETAILS_START
        .find(object)
        .map(|m| StringList(&STRING_LITERAL).extract_all(array_body(object, m.end())))
        .unwrap_or_default();

    ItemDraft {
        description: StringField(&ITEM_DESCRIPTION).extract(object),
        details,
        quantity: AmountField(&ITEM_QUANTITY).extract(object),
        unit_price: AmountField(&ITEM_UNIT_PRICE).extract(object),
        total: AmountField(&ITEM_TOTAL).extract(object),
        category: StringField(&ITEM_CATEGORY).extract(object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    #[test]
    fn test_scalars_from_prose() {
        let text = r#"The vendor is "vendor_name": "Acme Corp" and "total_due": 79.18, "invoice_date": "2024-02-10", "due_date": "soon"."#;
        let draft = recover_fields(text).unwrap();

        assert_eq!(draft.vendor_name.as_deref(), Some("Acme Corp"));
        assert_eq!(draft.total_due, Some(Decimal::new(7918, 2)));
        assert_eq!(draft.invoice_date, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert_eq!(draft.due_date, None);
        assert_eq!(draft.warnings.len(), 1);
        assert!(draft.items.is_empty());
    }

    #[test]
    fn test_items_from_truncated_output() {
        let text = r#"{"vendor_name": "Hotel Nusa", "items": [
            {"description": "Deluxe room", "details": ["2 nights", "breakfast [incl]"], "quantity": 2, "unit_price": 50.5, "total": 101},
            {"description": "", "quantity": 1},
            {"description": "Airport taxi", "category": "Transport", "total": 12.5},
            {"description": "Minibar", "quantity": 3, "unit_pr"#;
        let draft = recover_fields(text).unwrap();

        assert_eq!(draft.items.len(), 4);

        let room = &draft.items[0];
        assert_eq!(room.description.as_deref(), Some("Deluxe room"));
        assert_eq!(room.details, vec!["2 nights".to_string(), "breakfast [incl]".to_string()]);
        assert_eq!(room.quantity, Some(Decimal::from(2)));
        assert_eq!(room.unit_price, Some(Decimal::new(505, 1)));
        assert_eq!(room.total, Some(Decimal::from(101)));

        assert_eq!(draft.items[1].description, None);
        assert_eq!(draft.items[2].category.as_deref(), Some("Transport"));
        assert_eq!(draft.items[3].description.as_deref(), Some("Minibar"));
        assert_eq!(draft.items[3].quantity, Some(Decimal::from(3)));
        assert_eq!(draft.items[3].unit_price, None);
    }

    #[test]
    fn test_nothing_recognizable() {
        let draft = recover_fields("I could not read this image.").unwrap();
        assert_eq!(draft.vendor_name, None);
        assert_eq!(draft.total_due, None);
        assert!(draft.items.is_empty());
    }
}
