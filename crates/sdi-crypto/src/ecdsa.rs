//! # ECDSA P-256 signing and verification
//!
//! Wraps the `p256` implementation behind fixed-size artifact types:
//! 64-byte compact signatures (r ∥ s) and 35-byte public keys (2-byte
//! P-256 multikey prefix + 33-byte compressed SEC1 point). The proof
//! value codec depends on these exact sizes for validation.
//!
//! Signing is deterministic per RFC 6979, so a given key and message
//! always produce the same signature bytes.

use std::fmt;

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Byte length of a compact ECDSA P-256 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Byte length of a multikey-prefixed compressed P-256 public key.
pub const PUBLIC_KEY_LENGTH: usize = 35;

/// Multicodec varint prefix for a compressed P-256 public key (0x1200).
const P256_MULTIKEY_PREFIX: [u8; 2] = [0x80, 0x24];

/// A compact ECDSA P-256 signature (r ∥ s, 64 bytes).
#[derive(Clone, Eq)]
pub struct EcdsaSignature([u8; SIGNATURE_LENGTH]);

impl EcdsaSignature {
    /// Import a signature from raw bytes. The length must be exactly 64.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    fn to_signature(&self) -> Result<Signature, CryptoError> {
        Signature::from_slice(&self.0).map_err(|_| CryptoError::InvalidSignature)
    }
}

impl PartialEq for EcdsaSignature {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_abbrev_hex(f, "EcdsaSignature", &self.0)
    }
}

/// A 35-byte multikey public key: `0x80 0x24` + compressed SEC1 point.
#[derive(Clone, Eq)]
pub struct PublicKeyBytes([u8; PUBLIC_KEY_LENGTH]);

impl PublicKeyBytes {
    /// Import from raw bytes, validating length, multikey prefix, and
    /// that the remaining 33 bytes decode to a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKeyLength(bytes.len()))?;
        if bytes[..2] != P256_MULTIKEY_PREFIX {
            return Err(CryptoError::InvalidPublicKey(
                "missing P-256 multikey prefix".to_string(),
            ));
        }
        VerifyingKey::from_sec1_bytes(&bytes[2..])
            .map_err(|_| CryptoError::InvalidPublicKey("point not on curve".to_string()))?;
        Ok(Self(bytes))
    }

    /// The raw 35 key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Decode into a verifying key.
    pub fn to_verifying_key(&self) -> Result<EcdsaVerifyingKey, CryptoError> {
        let key = VerifyingKey::from_sec1_bytes(&self.0[2..])
            .map_err(|_| CryptoError::InvalidPublicKey("point not on curve".to_string()))?;
        Ok(EcdsaVerifyingKey(key))
    }
}

impl PartialEq for PublicKeyBytes {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_abbrev_hex(f, "PublicKeyBytes", &self.0)
    }
}

/// An ECDSA P-256 signing key.
///
/// Used both for the long-term issuer key and for the single-use
/// per-statement key generated at signing time.
#[derive(Clone)]
pub struct EcdsaSigningKey(SigningKey);

impl EcdsaSigningKey {
    /// Generate a fresh random key pair.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(SigningKey::random(rng))
    }

    /// Sign a message, producing a compact 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> EcdsaSignature {
        let signature: Signature = self.0.sign(message);
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes.copy_from_slice(&signature.to_bytes());
        EcdsaSignature(bytes)
    }

    /// The corresponding verifying key.
    pub fn verifying_key(&self) -> EcdsaVerifyingKey {
        EcdsaVerifyingKey(self.0.verifying_key().clone())
    }
}

impl fmt::Debug for EcdsaSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EcdsaSigningKey(..)")
    }
}

/// An ECDSA P-256 verifying key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaVerifyingKey(VerifyingKey);

impl EcdsaVerifyingKey {
    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &EcdsaSignature) -> Result<(), CryptoError> {
        let signature = signature.to_signature()?;
        self.0
            .verify(message, &signature)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    /// Export as multikey-prefixed compressed bytes.
    pub fn public_key_bytes(&self) -> PublicKeyBytes {
        let point = self.0.to_encoded_point(true);
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        bytes[..2].copy_from_slice(&P256_MULTIKEY_PREFIX);
        bytes[2..].copy_from_slice(point.as_bytes());
        PublicKeyBytes(bytes)
    }
}

fn write_abbrev_hex(f: &mut fmt::Formatter<'_>, name: &str, bytes: &[u8]) -> fmt::Result {
    write!(f, "{name}(")?;
    for byte in &bytes[..4] {
        write!(f, "{byte:02x}")?;
    }
    f.write_str("..)")
}
