//! # SHA-256 digest computation
//!
//! The single digest primitive used throughout the pipeline: statement
//! sequences, proof options, and commitments are all hashed with SHA-256.

use sha2::{Digest, Sha256};

/// Byte length of a SHA-256 digest.
pub const DIGEST_LENGTH: usize = 32;

/// Compute the SHA-256 digest of `bytes`.
pub fn sha256(bytes: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_hashes_to_known_digest() {
        // SHA-256("") — the sentinel digest for an empty mandatory set.
        let digest = sha256(b"");
        assert_eq!(
            digest[..4],
            [0xe3, 0xb0, 0xc4, 0x42],
            "unexpected SHA-256 of empty input"
        );
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(sha256(b"statement"), sha256(b"statement"));
    }

    #[test]
    fn different_input_produces_different_digest() {
        assert_ne!(sha256(b"a"), sha256(b"b"));
    }

    #[test]
    fn known_vector_abc() {
        let digest = sha256(b"abc");
        assert_eq!(digest[..4], [0xba, 0x78, 0x16, 0xbf]);
    }
}
