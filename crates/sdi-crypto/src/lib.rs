//! # sdi-crypto — Cryptographic Primitives for the SDI Stack
//!
//! This crate provides the cryptographic building blocks used by the
//! selective-disclosure pipeline:
//!
//! - **SHA-256 digest computation** for statement and proof-options
//!   hashing.
//! - **HMAC-SHA-256** keyed blank-node label derivation with 32-byte
//!   keys that are zeroized on drop.
//! - **ECDSA P-256** signing and verification with fixed-size artifacts:
//!   64-byte compact signatures and 35-byte multikey-prefixed compressed
//!   public keys.
//!
//! ## Security Invariants
//!
//! - Signing is deterministic (RFC 6979) — no per-signature randomness to
//!   leak.
//! - Fixed-size byte containers validate their length at construction;
//!   malformed points and truncated signatures never reach verification.
//! - Key material never appears in `Debug` output.

pub mod ecdsa;
pub mod error;
pub mod hash;
pub mod hmac;

// Re-export primary types.
pub use ecdsa::{
    EcdsaSignature, EcdsaSigningKey, EcdsaVerifyingKey, PublicKeyBytes, PUBLIC_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
pub use error::CryptoError;
pub use hash::{sha256, DIGEST_LENGTH};
pub use hmac::{hmac_sha256, HmacKey, HMAC_KEY_LENGTH};
