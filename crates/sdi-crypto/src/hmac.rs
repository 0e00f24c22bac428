//! # HMAC-SHA-256 keyed labeling
//!
//! Blank-node labels are randomized per signing run with a keyed
//! pseudorandom function so that two proofs over structurally similar
//! documents do not correlate through canonical labels. The key is
//! disclosed inside the base proof, letting the holder reproduce the
//! exact statement sequence the signer committed to.

use std::fmt;

use hmac::{Hmac, Mac};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::hash::DIGEST_LENGTH;

/// Byte length of an HMAC key.
pub const HMAC_KEY_LENGTH: usize = 32;

/// A 256-bit HMAC key. Zeroized on drop; never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct HmacKey([u8; HMAC_KEY_LENGTH]);

impl HmacKey {
    /// Generate a fresh random key.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; HMAC_KEY_LENGTH];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Import a key from raw bytes. The length must be exactly 32.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; HMAC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidHmacKeyLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Export the raw key bytes (embedded in the base proof value).
    pub fn as_bytes(&self) -> &[u8; HMAC_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HmacKey(..)")
    }
}

/// Compute HMAC-SHA-256 over `bytes` with `key`.
pub fn hmac_sha256(key: &HmacKey, bytes: &[u8]) -> [u8; DIGEST_LENGTH] {
    // A 32-byte key is always a valid HMAC-SHA-256 key.
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(bytes);
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn generated_keys_differ() {
        let a = HmacKey::generate(&mut OsRng);
        let b = HmacKey::generate(&mut OsRng);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn import_export_roundtrip() {
        let key = HmacKey::generate(&mut OsRng);
        let imported = HmacKey::from_bytes(key.as_bytes()).unwrap();
        assert_eq!(key, imported);
    }

    #[test]
    fn wrong_length_import_is_rejected() {
        let err = HmacKey::from_bytes(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidHmacKeyLength(16)));
    }

    #[test]
    fn mac_is_deterministic_under_fixed_key() {
        let key = HmacKey::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(hmac_sha256(&key, b"c14n0"), hmac_sha256(&key, b"c14n0"));
        assert_ne!(hmac_sha256(&key, b"c14n0"), hmac_sha256(&key, b"c14n1"));
    }

    #[test]
    fn mac_differs_across_keys() {
        let a = HmacKey::from_bytes(&[1u8; 32]).unwrap();
        let b = HmacKey::from_bytes(&[2u8; 32]).unwrap();
        assert_ne!(hmac_sha256(&a, b"label"), hmac_sha256(&b, b"label"));
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let key = HmacKey::from_bytes(&[0xAB; 32]).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("171"));
        assert!(!debug.to_lowercase().contains("ab"));
    }
}
