//! Shared SHA-256 hex digest utility.
//!
//! Session ids are only ever persisted as their digest so that a leaked
//! `user_sessions` table does not hand out live sessions.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn distinct_inputs_produce_distinct_digests() {
        assert_ne!(sha256_hex(b"session-a"), sha256_hex(b"session-b"));
        assert_eq!(sha256_hex(b"session-a").len(), 64);
    }
}
