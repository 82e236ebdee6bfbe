//! Canonical JSON encoding for world state values.
//!
//! Every value the contract writes goes through [`to_canonical_vec`]: object
//! keys sorted lexicographically at every depth, compact output with no
//! incidental whitespace. Identical inputs therefore produce identical bytes
//! on every replica, whatever order fields were populated in.

use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `value` to canonical JSON bytes.
pub fn to_canonical_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_vec(&sort_keys(value))
}

/// Recursively sort all object keys lexicographically.
///
/// `serde_json::Map` iterates in key order unless the `preserve_order`
/// feature is enabled somewhere in the build; rebuilding the map from
/// sorted keys keeps the output stable either way.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, v) in entries {
                sorted.insert(key, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_are_sorted() {
        let v = json!({"b": {"z": 1, "a": [{"y": 2, "x": 3}]}, "a": null});
        let bytes = to_canonical_vec(&v).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":null,"b":{"a":[{"x":3,"y":2}],"z":1}}"#
        );
    }

    #[test]
    fn uppercase_keys_sort_before_lowercase() {
        let v = json!({"docType": "engine", "ID": "e1", "Age": 2});
        let bytes = to_canonical_vec(&v).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"Age":2,"ID":"e1","docType":"engine"}"#
        );
    }

    #[test]
    fn array_order_is_preserved() {
        let v = json!(["second", "first"]);
        assert_eq!(to_canonical_vec(&v).unwrap(), br#"["second","first"]"#.to_vec());
    }
}
