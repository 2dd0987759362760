//! Content addressing.
//!
//! The canonicalization contract: a value is serialized as JSON with object
//! keys sorted recursively at every level, then hashed with sha256. Equal
//! values therefore hash equally regardless of construction order, across
//! processes and across runs.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Stable content hash of a value, as `"sha256:<hex>"`.
pub fn content_hash(value: &Value) -> String {
  let mut hasher = Sha256::new();
  hasher.update(canonicalize(value).to_string().as_bytes());
  format!("sha256:{}", hex::encode(hasher.finalize()))
}

fn canonicalize(value: &Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut keys: Vec<&String> = map.keys().collect();
      keys.sort_unstable();
      Value::Object(
        keys
          .into_iter()
          .map(|key| (key.clone(), canonicalize(&map[key])))
          .collect(),
      )
    }
    Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
    other => other.clone(),
  }
}
