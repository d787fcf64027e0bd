//! Canonical JSON and content digests for compiled specs.
//!
//! A run spec's `name` is its human-facing identifier; the digest is the
//! content key. Two specs with equal content always hash equally, whatever
//! order their argument maps were populated in.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::domain::error::{Result, RunSpecError};

/// Sort object keys recursively and normalize numbers.
///
/// Integer-valued floats collapse to integers so that `1.0` and `1` hash the
/// same; NaN and infinities are rejected.
fn canonicalize(value: &Value) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()])?);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(canonicalize).collect::<Result<Vec<_>>>()?,
        )),
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if !f.is_finite() {
                return Err(RunSpecError::NonCanonicalValue(n.to_string()));
            }
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Ok(Value::Number(Number::from(f as i64)))
            } else {
                Ok(Value::Number(n.clone()))
            }
        }
        other => Ok(other.clone()),
    }
}

/// Compact canonical JSON text for `value`.
pub fn canonical_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&canonicalize(value)?)?)
}

/// SHA-256 hex digest of the canonical JSON form of `item`.
pub fn content_digest<T: Serialize>(item: &T) -> Result<String> {
    let value = serde_json::to_value(item)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(&value)?.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let input = json!({ "scenario": { "subject": "anatomy", "args": 1 }, "name": "mmlu" });
        let canonical = canonical_json(&input).expect("canonical_json");
        assert_eq!(
            canonical,
            r#"{"name":"mmlu","scenario":{"args":1,"subject":"anatomy"}}"#
        );
    }

    #[test]
    fn test_canonical_json_integer_valued_float() {
        let canonical = canonical_json(&json!({ "temperature": 1.0 })).expect("canonical_json");
        assert_eq!(canonical, r#"{"temperature":1}"#);
    }

    #[test]
    fn test_canonical_json_keeps_fraction() {
        let canonical = canonical_json(&json!({ "temperature": 0.7 })).expect("canonical_json");
        assert_eq!(canonical, r#"{"temperature":0.7}"#);
    }

    #[test]
    fn test_canonical_json_preserves_array_order() {
        let a = canonical_json(&json!({ "stop": ["\n", "###"] })).expect("a");
        let b = canonical_json(&json!({ "stop": ["###", "\n"] })).expect("b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_ignores_key_insertion_order() {
        let mut first = Map::new();
        first.insert("subject".into(), json!("anatomy"));
        first.insert("level".into(), json!(1));
        let mut second = Map::new();
        second.insert("level".into(), json!(1));
        second.insert("subject".into(), json!("anatomy"));

        let d1 = content_digest(&Value::Object(first)).expect("digest 1");
        let d2 = content_digest(&Value::Object(second)).expect("digest 2");
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert!(d1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_changes_with_content() {
        let d1 = content_digest(&json!({ "model": "openai/davinci" })).expect("digest 1");
        let d2 = content_digest(&json!({ "model": "ai21/j1-large" })).expect("digest 2");
        assert_ne!(d1, d2);
    }
}
