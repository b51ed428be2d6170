use serde_json::Value;

use super::StageError;
use crate::extraction::assemble::InvoiceDraft;
use crate::extraction::payload::InvoicePayload;

/// Decode the whole text as one invoice object.
pub(crate) fn decode_structured(text: &str) -> Result<InvoiceDraft, StageError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(StageError::NotAnObject);
    }

    let payload: InvoicePayload = serde_json::from_value(value)?;
    Ok(payload.into_draft())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_structured() {
        let draft = decode_structured(r#" {"vendor_name": "Acme", "items": []} "#).unwrap();
        assert_eq!(draft.vendor_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(matches!(
            decode_structured(r#"["Acme", "INV-1"]"#),
            Err(StageError::NotAnObject)
        ));
        assert!(matches!(decode_structured("null"), Err(StageError::NotAnObject)));
    }

    #[test]
    fn test_rejects_trailing_prose() {
        assert!(matches!(
            decode_structured(r#"{"vendor_name": "Acme"} Hope this helps!"#),
            Err(StageError::Decode(_))
        ));
    }
}
