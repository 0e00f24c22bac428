//! # Cryptographic error types
//!
//! Structured errors for all cryptographic operations in `sdi-crypto`.
//! Uses `thiserror` for ergonomic error definitions with diagnostic
//! context.

use thiserror::Error;

/// Errors from cryptographic operations in the SDI stack.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// ECDSA signature verification failed.
    #[error("ECDSA P-256 verification failed")]
    VerificationFailed,

    /// Invalid ECDSA signature length.
    #[error("invalid ECDSA signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// The signature bytes do not encode a valid P-256 signature.
    #[error("invalid ECDSA signature encoding")]
    InvalidSignature,

    /// Invalid public key length.
    #[error("invalid public key length: expected 35 bytes, got {0}")]
    InvalidPublicKeyLength(usize),

    /// The public key bytes do not carry the P-256 multikey prefix or do
    /// not decode to a point on the curve.
    #[error("invalid P-256 public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid HMAC key length.
    #[error("invalid HMAC key length: expected 32 bytes, got {0}")]
    InvalidHmacKeyLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_length_display_names_both_sizes() {
        let err = CryptoError::InvalidSignatureLength(63);
        let msg = format!("{err}");
        assert!(msg.contains("64 bytes"));
        assert!(msg.contains("63"));
    }

    #[test]
    fn public_key_length_display_names_both_sizes() {
        let err = CryptoError::InvalidPublicKeyLength(33);
        let msg = format!("{err}");
        assert!(msg.contains("35 bytes"));
        assert!(msg.contains("33"));
    }

    #[test]
    fn hmac_key_length_display_names_both_sizes() {
        let err = CryptoError::InvalidHmacKeyLength(16);
        let msg = format!("{err}");
        assert!(msg.contains("32 bytes"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn all_variants_are_debug() {
        let variants = vec![
            CryptoError::VerificationFailed,
            CryptoError::InvalidSignatureLength(0),
            CryptoError::InvalidSignature,
            CryptoError::InvalidPublicKeyLength(0),
            CryptoError::InvalidPublicKey("off curve".into()),
            CryptoError::InvalidHmacKeyLength(0),
        ];
        for v in variants {
            assert!(!format!("{v:?}").is_empty());
        }
    }
}
