//! Deterministic canonicalization and hashing.
//!
//! Canonical form: object keys sorted lexicographically at every level,
//! array order preserved, primitives in their JSON literal form, no
//! whitespace. The hash is the SHA-256 hex digest of the canonical string's
//! UTF-8 bytes, and the content identifier wraps that hash in a fixed
//! prefix.
//!
//! This is deliberately NOT RDFC-1.0 dataset canonicalization: there is no
//! blank-node handling and array element order is significant. Content
//! identifiers and reachability coalescing depend on this exact behavior,
//! so it must not be "upgraded" in place.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Content identifier prefix. Stable across versions.
pub const CID_PREFIX: &str = "ipfs://sha256-";

/// A canonicalized value: the canonical string and its SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalized {
    pub canonical: String,
    pub hash: String,
}

/// Produce the deterministic canonical string for a value.
///
/// Identical data with different key insertion order yields an identical
/// result; reordering array elements changes it.
pub fn canonical_form(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            // Display for scalar values is their JSON literal form.
            out.push_str(&value.to_string());
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(&Value::String((*key).clone()), out);
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

/// SHA-256 hex digest of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Canonicalize a value and hash its canonical form.
pub fn canonicalize(value: &Value) -> Canonicalized {
    let canonical = canonical_form(value);
    let hash = sha256_hex(canonical.as_bytes());
    Canonicalized { canonical, hash }
}

/// Wrap a canonical hash in the content-identifier prefix.
pub fn content_id(hash: &str) -> String {
    format!("{CID_PREFIX}{hash}")
}
