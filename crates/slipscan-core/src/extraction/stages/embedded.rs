use super::StageError;
use super::structured::decode_structured;
use crate::extraction::assemble::InvoiceDraft;
use crate::extraction::rules::patterns::CODE_FENCE;

/// Strip code fences and decode the span from the first `{` to the last `}`.
pub(crate) fn decode_embedded(text: &str) -> Result<InvoiceDraft, StageError> {
    let stripped = CODE_FENCE.replace_all(text, "");

    let start = stripped.find('{').ok_or(StageError::NoJsonObject)?;
    let end = stripped.rfind('}').ok_or(StageError::NoJsonObject)?;
    if end < start {
        return Err(StageError::NoJsonObject);
    }

    decode_structured(&stripped[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"vendor_name\": \"Acme\"}\n```";
        let draft = decode_embedded(text).unwrap();
        assert_eq!(draft.vendor_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_json_in_prose() {
        let text = "Sure! Here is the invoice:\n{\"invoice_number\": \"INV-9\"}\nLet me know.";
        let draft = decode_embedded(text).unwrap();
        assert_eq!(draft.invoice_number.as_deref(), Some("INV-9"));
    }

    #[test]
    fn test_no_object() {
        assert!(matches!(
            decode_embedded("no braces here"),
            Err(StageError::NoJsonObject)
        ));
        assert!(matches!(
            decode_embedded("} backwards {"),
            Err(StageError::NoJsonObject)
        ));
    }

    #[test]
    fn test_truncated_object_fails() {
        assert!(matches!(
            decode_embedded(r#"{"vendor_name": "Acme", "items": [{"description": "Wid"#),
            Err(StageError::NoJsonObject)
        ));
    }
}
