//! Hashing primitives for powledger
//!
//! Blocks are digested over a canonical JSON rendering in which object keys
//! are sorted by name, so the digest never depends on field order.

use crate::blockchain::Block;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 of `data`, hex-encoded (64 lowercase characters).
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Rebuild `value` with every object's keys in ascending order.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Compact JSON text with sorted keys.
pub fn canonical_json(value: &Value) -> String {
    sort_keys(value).to_string()
}

/// Digest of an arbitrary JSON value in canonical form.
pub fn hash_value(value: &Value) -> String {
    sha256_hex(canonical_json(value).as_bytes())
}

/// Digest of a block, as stamped into its successor's `previous_hash`.
pub fn hash_block(block: &Block) -> String {
    hash_value(&block.to_json())
}
