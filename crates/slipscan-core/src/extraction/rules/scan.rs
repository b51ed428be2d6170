//! Bracket matching over possibly truncated JSON text.
//!
//! Both scanners skip over string literals, so brackets and braces inside
//! quoted values never affect nesting. Input cut off before its closing
//! bracket extends to the end of the text.

/// Body of the array whose opening `[` ends right before `start`.
pub fn array_body(text: &str, start: usize) -> &str {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                if depth == 0 {
                    return &text[start..i];
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    &text[start..]
}

/// Top-level `{...}` spans in an array body, braces included.
pub fn object_spans(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut open = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = open.take() {
                        spans.push(&body[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(s) = open {
        spans.push(&body[s..]);
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_body_nested() {
        let text = r#"[{"details": ["a]", "b"]}, {"x": 1}] tail"#;
        assert_eq!(array_body(text, 1), r#"{"details": ["a]", "b"]}, {"x": 1}"#);
    }

    #[test]
    fn test_array_body_unterminated() {
        let text = r#"[{"description": "Widget"}, {"descr"#;
        assert_eq!(array_body(text, 1), r#"{"description": "Widget"}, {"descr"#);
    }

    #[test]
    fn test_object_spans() {
        let body = r#"{"a": "}"}, {"b": {"c": 1}}, {"d": 2"#;
        assert_eq!(
            object_spans(body),
            vec![r#"{"a": "}"}"#, r#"{"b": {"c": 1}}"#, r#"{"d": 2"#]
        );
    }

    #[test]
    fn test_object_spans_empty() {
        assert!(object_spans("  ").is_empty());
    }
}
