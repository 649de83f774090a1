// ABOUTME: Typed optional-field extraction over serde_json values.
// ABOUTME: Shared by the JSON Feed and RSS-in-JSON parsers; absent/mistyped fields yield None.

use serde_json::{Map, Value};

pub(crate) type JsonObject = Map<String, Value>;

/// Nested object field.
pub(crate) fn object_field<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    obj.get(key).and_then(Value::as_object)
}

/// Array field by structural type check: a present-but-non-array value is
/// treated the same as an absent one.
pub(crate) fn array_field<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

/// Non-empty trimmed string field.
pub(crate) fn string_field(obj: &JsonObject, key: &str) -> Option<String> {
    let s = obj.get(key)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Identifier field: a string, a number, or an object carrying `#value`
/// (the RSS-in-JSON guid convention).
pub(crate) fn id_field(obj: &JsonObject, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(inner) => string_field(inner, "#value"),
        _ => None,
    }
}

pub(crate) fn bool_field(obj: &JsonObject, key: &str) -> Option<bool> {
    obj.get(key)?.as_bool()
}

/// Byte-count field: numeric, or a numeric string. Anything else is absent.
pub(crate) fn size_field(obj: &JsonObject, key: &str) -> Option<u64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Duration field in whole seconds.
pub(crate) fn duration_field(obj: &JsonObject, key: &str) -> Option<u32> {
    size_field(obj, key).and_then(|secs| u32::try_from(secs).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> JsonObject {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_string_field_trims_and_rejects_empty() {
        let o = obj(json!({"a": " x ", "b": "", "c": 3}));
        assert_eq!(string_field(&o, "a").as_deref(), Some("x"));
        assert_eq!(string_field(&o, "b"), None);
        assert_eq!(string_field(&o, "c"), None);
        assert_eq!(string_field(&o, "missing"), None);
    }

    #[test]
    fn test_id_field_accepts_string_number_and_hash_value() {
        let o = obj(json!({"s": "abc", "n": 42, "g": {"#value": "guid-1"}, "o": {}}));
        assert_eq!(id_field(&o, "s").as_deref(), Some("abc"));
        assert_eq!(id_field(&o, "n").as_deref(), Some("42"));
        assert_eq!(id_field(&o, "g").as_deref(), Some("guid-1"));
        assert_eq!(id_field(&o, "o"), None);
    }

    #[test]
    fn test_size_field_coerces_numeric_strings() {
        let o = obj(json!({"n": 12345, "s": "678", "bad": "12MB", "neg": -1}));
        assert_eq!(size_field(&o, "n"), Some(12345));
        assert_eq!(size_field(&o, "s"), Some(678));
        assert_eq!(size_field(&o, "bad"), None);
        assert_eq!(size_field(&o, "neg"), None);
    }

    #[test]
    fn test_array_field_is_structural() {
        let o = obj(json!({"arr": [1], "not": {"0": 1}}));
        assert!(array_field(&o, "arr").is_some());
        assert!(array_field(&o, "not").is_none());
    }
}
