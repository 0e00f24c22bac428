//! # Cryptosuite error types
//!
//! Every operation either returns a definitive success value or fails the
//! whole call — there is no partial success anywhere in this pipeline.
//! The variants keep the three failure families distinguishable:
//! malformed input (`InvalidProofValue`, pointer and document errors),
//! empty selection (`NothingSelected`), and cryptographic mismatch
//! (`SignatureCountMismatch`, `InvalidSignature`, `InvalidBaseSignature`).
//!
//! Per-statement verification failures deliberately do not say which
//! statement failed.

use sdi_crypto::CryptoError;
use sdi_primitives::PrimitiveError;
use thiserror::Error;

/// Low-level causes behind a rejected proof value. Attached to
/// [`SuiteError::InvalidProofValue`] as its source; not intended for
/// display to untrusted callers.
#[derive(Error, Debug)]
pub enum ProofValueError {
    /// The proof value is missing or not a string.
    #[error("proofValue must be a string")]
    NotAString,

    /// Only multibase base64url (`u`) encoding is supported.
    #[error("only base64url multibase encoding is supported")]
    Encoding,

    /// The 3-byte tag prefix is not an ECDSA-SD tag.
    #[error("unrecognized proof value tag")]
    UnknownTag,

    /// A base proof value was required.
    #[error("proofValue must be a base proof")]
    ExpectedBase,

    /// A derived proof value was required.
    #[error("proofValue must be a derived proof")]
    ExpectedDerived,

    /// The CBOR payload does not parse or has the wrong shape.
    #[error("malformed payload: {0}")]
    Payload(String),

    /// A payload field has the wrong size or type.
    #[error("{0}")]
    Field(String),
}

/// Errors from the `ecdsa-sd-2023` cryptosuite operations.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// The proof does not carry a valid `proofValue`. The low-level cause
    /// is attached for diagnostics.
    #[error("the proof does not include a valid proofValue")]
    InvalidProofValue(#[source] ProofValueError),

    /// Disclosure was requested with no mandatory and no selective
    /// pointers. Distinct from corruption so callers can branch on
    /// intent.
    #[error("nothing selected for disclosure")]
    NothingSelected,

    /// The number of disclosed per-statement signatures does not match
    /// the number of non-mandatory statements.
    #[error(
        "signature count mismatch: {signatures} signatures for \
         {non_mandatory} non-mandatory statements"
    )]
    SignatureCountMismatch {
        signatures: usize,
        non_mandatory: usize,
    },

    /// A per-statement signature failed to verify. Which statement is
    /// deliberately not reported.
    #[error("invalid signature")]
    InvalidSignature,

    /// The holder-binding signature over the commitment failed to verify.
    #[error("invalid base signature")]
    InvalidBaseSignature,

    /// No matching base proof to operate on.
    #[error("no matching proof found")]
    MissingProof,

    /// Multiple candidate proofs and no proof id to disambiguate.
    #[error("multiple matching proofs; a proof id must be specified")]
    AmbiguousProof,

    /// The verification method could not be resolved to a key.
    #[error("cannot resolve verification method: {0}")]
    KeyResolution(String),

    /// The document or proof structure is unusable.
    #[error("malformed document: {0}")]
    Document(String),

    /// Canonicalization, selection, or grouping failed.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    /// A cryptographic primitive failed outside of signature checks.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
