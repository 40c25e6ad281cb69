//! JSON Pointer helpers for the `#/a/b` convention used in results
//!
//! Result values and diagnostics quote locations as fragment-style pointers
//! (`#`, `#/ldhName`, `#/entities/0/handle`). RFC 6901 evaluation is done by
//! `serde_json`; this module only handles the fragment prefix and the
//! `pointer:value` rendering convention.

use serde_json::Value;

/// Looks up `pointer` (in `#/a/b` form, `#` for the root) in `document`.
pub fn query<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let path = pointer.strip_prefix('#').unwrap_or(pointer);
    if path.is_empty() {
        return Some(document);
    }
    document.pointer(path)
}

/// Renders the value at `pointer` the way it appears in result values:
/// strings without quotes, everything else as compact JSON, `null` when the
/// pointer does not resolve.
pub fn value_at(document: &Value, pointer: &str) -> String {
    match query(document, pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

/// The conventional `pointer:value` result value.
pub fn result_value(document: &Value, pointer: &str) -> String {
    format!("{}:{}", pointer, value_at(document, pointer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_root() {
        let doc = json!({"handle": "ABC-TLD"});
        assert_eq!(query(&doc, "#"), Some(&doc));
    }

    #[test]
    fn test_query_nested() {
        let doc = json!({"entities": [{"handle": "X-TLD"}]});
        assert_eq!(
            query(&doc, "#/entities/0/handle"),
            Some(&json!("X-TLD"))
        );
        assert_eq!(query(&doc, "#/entities/3/handle"), None);
    }

    #[test]
    fn test_value_rendering() {
        let doc = json!({"ldhName": "a.example", "port43": 43, "active": true});
        assert_eq!(value_at(&doc, "#/ldhName"), "a.example");
        assert_eq!(value_at(&doc, "#/port43"), "43");
        assert_eq!(value_at(&doc, "#/active"), "true");
        assert_eq!(value_at(&doc, "#/missing"), "null");
    }

    #[test]
    fn test_result_value() {
        let doc = json!({"handle": "ABCDEF"});
        assert_eq!(result_value(&doc, "#/handle"), "#/handle:ABCDEF");
    }

}
