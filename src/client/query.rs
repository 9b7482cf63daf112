//! Query-string encoding for GET endpoints.
//!
//! `serde_urlencoded` (what `RequestBuilder::query` uses) rejects sequences,
//! so filters are flattened through `serde_json::Value` instead. Lists become
//! repeated `key[]` pairs in their original order, nested objects become
//! `key[sub]`, and nulls are dropped.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Flatten a serializable filter into `(key, value)` query pairs
pub fn to_query_pairs<T: Serialize + ?Sized>(value: &T) -> Result<Vec<(String, String)>> {
    let json = serde_json::to_value(value).map_err(Error::Encode)?;
    let mut pairs = Vec::new();

    match json {
        Value::Object(map) => {
            for (key, value) in map {
                push_pairs(&mut pairs, key, value);
            }
        }
        Value::Null => {}
        other => {
            return Err(Error::Encode(<serde_json::Error as serde::ser::Error>::custom(
                format!("query parameters must serialize to an object, got {}", other),
            )))
        }
    }

    Ok(pairs)
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s)),
        Value::Array(items) => {
            let item_key = format!("{}[]", key);
            for item in items {
                push_pairs(pairs, item_key.clone(), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                push_pairs(pairs, format!("{}[{}]", key, sub), item);
            }
        }
    }
}
