//! # sdi-ecdsa — The `ecdsa-sd-2023` Selective-Disclosure Cryptosuite
//!
//! A signer produces one **base proof** over a full document; any holder
//! can later **derive** a disclosure proof revealing only a chosen subset
//! of the document's statements, without access to the signing key; a
//! verifier confirms both the revealed subset and that the undisclosed
//! remainder was not tampered with.
//!
//! The crate exposes one entry point per role:
//!
//! - [`sign_base`] — issuer: canonicalize, group by mandatory pointers,
//!   sign each non-mandatory statement with a single-use key, and bind
//!   everything with one long-term signature over the commitment.
//! - [`confirm_base`] — issuer-side direct check of a base proof.
//! - [`derive`] — holder: project the reveal document, filter the
//!   per-statement signatures, and attach a derived proof.
//! - [`verify_derived`] — verifier: reconstruct the statement partition
//!   from the disclosed label map and indexes, then check every
//!   signature.
//!
//! Role separation is structural: each operation takes its own options
//! type, so a sign-only configuration cannot be driven through the
//! verify path. The proof-value mode tag is still checked at decode
//! time, so a base proof handed to the verifier (or vice versa) fails
//! with a typed error.

pub mod confirm;
pub mod disclose;
pub mod error;
pub mod proof;
pub mod proof_value;
pub mod sign;
pub mod verify;

// Re-export primary types.
pub use confirm::confirm_base;
pub use disclose::{derive, DiscloseOptions};
pub use error::{ProofValueError, SuiteError};
pub use proof::{DataIntegrityProof, ProofPurpose, CRYPTOSUITE, PROOF_TYPE};
pub use proof_value::{BaseProofPayload, DisclosureProofPayload, ProofPayload};
pub use sign::{sign_base, SignOptions};
pub use verify::verify_derived;
