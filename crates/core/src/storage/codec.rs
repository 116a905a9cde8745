//! Conversion between the store's tagged attribute values and plain values.
//!
//! The store preserves types across its transport by wrapping every value in
//! a single-entry object whose key names the type (`{"S": "abc"}`,
//! `{"N": "4.2"}`, `{"M": {...}}`). Application code works with plain
//! [`serde_json::Value`]s. These functions are pure.

use serde_json::{Map, Number, Value};

/// A plain item: field name to value.
pub type Item = Map<String, Value>;

pub const TAG_STRING: &str = "S";
pub const TAG_NUMBER: &str = "N";
pub const TAG_BOOLEAN: &str = "BOOL";
pub const TAG_BINARY: &str = "B";
pub const TAG_NULL: &str = "NULL";
pub const TAG_MAP: &str = "M";
pub const TAG_LIST: &str = "L";

const TAGS: [&str; 7] = [
    TAG_STRING,
    TAG_NUMBER,
    TAG_BOOLEAN,
    TAG_BINARY,
    TAG_NULL,
    TAG_MAP,
    TAG_LIST,
];

/// Strips type tags from `value`, recursing through maps and lists.
///
/// Untagged values pass through unchanged.
pub fn decode(value: &Value) -> Value {
    match value {
        Value::Object(object) => match single_tag(object) {
            Some((tag, inner)) => decode_tagged(tag, inner),
            None => Value::Object(decode_item(object)),
        },
        Value::Array(values) => Value::Array(values.iter().map(decode).collect()),
        other => other.clone(),
    }
}

/// Decodes every attribute of a tagged item.
pub fn decode_item(item: &Item) -> Item {
    item.iter()
        .map(|(key, value)| (key.clone(), decode(value)))
        .collect()
}

/// Wraps a plain value in the store's type tags.
pub fn encode(value: &Value) -> Value {
    let (tag, inner) = match value {
        Value::Null => (TAG_NULL, Value::Bool(true)),
        Value::Bool(b) => (TAG_BOOLEAN, Value::Bool(*b)),
        Value::Number(n) => (TAG_NUMBER, Value::String(n.to_string())),
        Value::String(s) => (TAG_STRING, Value::String(s.clone())),
        Value::Array(values) => (TAG_LIST, Value::Array(values.iter().map(encode).collect())),
        Value::Object(object) => (TAG_MAP, Value::Object(encode_item(object))),
    };
    let mut wrapper = Map::with_capacity(1);
    wrapper.insert(tag.to_string(), inner);
    Value::Object(wrapper)
}

/// Encodes every attribute of a plain item.
pub fn encode_item(item: &Item) -> Item {
    item.iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect()
}

fn single_tag(object: &Map<String, Value>) -> Option<(&str, &Value)> {
    if object.len() != 1 {
        return None;
    }
    let (key, inner) = object.iter().next()?;
    let tag = TAGS.iter().find(|tag| **tag == key.as_str())?;
    is_tag_payload(tag, inner).then_some((*tag, inner))
}

// A field that merely happens to be named like a tag is only unwrapped when
// its payload has the shape that tag carries.
fn is_tag_payload(tag: &str, inner: &Value) -> bool {
    match tag {
        TAG_STRING => inner.is_string(),
        TAG_NUMBER => inner.is_string() || inner.is_number(),
        TAG_BOOLEAN | TAG_NULL => inner.is_boolean(),
        TAG_BINARY => inner.is_boolean() || inner.is_string(),
        TAG_MAP => inner.is_object(),
        TAG_LIST => inner.is_array(),
        _ => false,
    }
}

fn decode_tagged(tag: &str, inner: &Value) -> Value {
    match tag {
        TAG_NUMBER => decode_number(inner),
        TAG_NULL => Value::Null,
        TAG_MAP => match inner {
            Value::Object(fields) => Value::Object(decode_item(fields)),
            other => other.clone(),
        },
        TAG_LIST => match inner {
            Value::Array(values) => Value::Array(values.iter().map(decode).collect()),
            other => other.clone(),
        },
        _ => inner.clone(),
    }
}

fn decode_number(inner: &Value) -> Value {
    let Some(text) = inner.as_str() else {
        return inner.clone();
    };
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(&json!({ "S": "abc" })), json!("abc"));
        assert_eq!(decode(&json!({ "N": "42" })), json!(42));
        assert_eq!(decode(&json!({ "N": "3.5" })), json!(3.5));
        assert_eq!(decode(&json!({ "BOOL": false })), json!(false));
        assert_eq!(decode(&json!({ "B": true })), json!(true));
        assert_eq!(decode(&json!({ "NULL": true })), Value::Null);
    }

    #[test]
    fn test_decode_false_boolean_is_not_dropped() {
        let decoded = decode_item(&item(json!({ "pending": { "BOOL": false } })));
        assert_eq!(decoded.get("pending"), Some(&json!(false)));
    }

    #[test]
    fn test_decode_nested_maps_and_lists() {
        let tagged = item(json!({
            "user": { "S": "u1" },
            "raw": { "M": {
                "amount": { "N": "0.99" },
                "tags": { "L": [{ "S": "a" }, { "S": "b" }] }
            }},
            "connections": { "L": [{ "S": "c1" }] }
        }));

        assert_eq!(
            Value::Object(decode_item(&tagged)),
            json!({
                "user": "u1",
                "raw": { "amount": 0.99, "tags": ["a", "b"] },
                "connections": ["c1"]
            })
        );
    }

    #[test]
    fn test_decode_untagged_nested_mapping() {
        let tagged = item(json!({
            "outer": { "inner": { "S": "x" }, "count": { "N": "2" } }
        }));
        assert_eq!(
            Value::Object(decode_item(&tagged)),
            json!({ "outer": { "inner": "x", "count": 2 } })
        );
    }

    #[test]
    fn test_decode_is_identity_on_plain_items() {
        let plain = item(json!({
            "id": "c1",
            "name": "Bank",
            "amount": 12.5,
            "pending": false,
            "finishedDate": null,
            "connections": ["c1", "c2"],
            "raw": { "S": 3, "N": [1], "nested": { "M": "text" } }
        }));
        assert_eq!(decode_item(&plain), plain);
    }

    #[test]
    fn test_decode_keeps_unparseable_numbers_as_text() {
        assert_eq!(decode(&json!({ "N": "not-a-number" })), json!("not-a-number"));
    }

    #[test]
    fn test_encode_wraps_every_level() {
        assert_eq!(
            encode(&json!({ "a": [1, "x", true, null] })),
            json!({ "M": { "a": { "L": [
                { "N": "1" },
                { "S": "x" },
                { "BOOL": true },
                { "NULL": true }
            ]}}})
        );
    }

    #[test]
    fn test_decode_reverses_encode() {
        let plain = item(json!({
            "user": "u1",
            "amount": -4,
            "status#transactionDate": "posted#2024-01-01#t1",
            "raw": { "pending": false, "amount": 1.25 }
        }));
        assert_eq!(decode_item(&encode_item(&plain)), plain);
    }
}
