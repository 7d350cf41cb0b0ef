//! JSON pretty-printing.

use tracing::debug;

/// Pretty-print with two-space indentation, keeping key order.
///
/// Text that does not parse is returned unmodified.
pub fn pretty_json(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(e) => {
            debug!(error = %e, "JSON did not parse, showing raw text");
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_two_space_indent() {
        assert_eq!(
            pretty_json(r#"{"b":1,"a":[true,null]}"#),
            "{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}"
        );
    }

    #[test]
    fn test_invalid_json_unchanged() {
        let raw = "{not: json,,}";
        assert_eq!(pretty_json(raw), raw);
    }
}
