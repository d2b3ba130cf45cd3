//! crates/psup_io/src/hasher.rs
//! SHA-256 digests (lowercase hex) over canonical JSON bytes.

use psup_core::AdmissionInput;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_json_bytes;
use crate::IoResult;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn sha256_canonical(v: &Value) -> String {
    sha256_hex(&to_canonical_json_bytes(v))
}

/// Digest of the input as it would be archived: independent of the source
/// file's key order and whitespace.
pub fn input_digest(input: &AdmissionInput) -> IoResult<String> {
    Ok(sha256_canonical(&crate::writer::input_value(input)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_digest_is_the_known_value() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn key_order_does_not_change_the_digest() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":[1,2]}"#).unwrap();
        let b = json!({"y": [1, 2], "x": 1});
        assert_eq!(sha256_canonical(&a), sha256_canonical(&b));
        assert_ne!(sha256_canonical(&a), sha256_canonical(&json!({"x": 1, "y": [2, 1]})));
    }
}
