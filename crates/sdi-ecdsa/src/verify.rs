//! # Disclosure verification
//!
//! The verifier-side operation: reconstruct the statement partition from
//! the disclosed label map and relative mandatory indexes, recompute the
//! mandatory-statement commitment, and validate both the per-statement
//! signatures and the holder-binding signature. The verifier never
//! learns the label-derivation key — only the minimal label map needed
//! for this document.
//!
//! Structural checks run before any signature work and short-circuit on
//! failure; per-statement failures are reported without naming the
//! statement.

use std::collections::BTreeSet;

use sdi_core::Statement;
use sdi_crypto::EcdsaVerifyingKey;
use sdi_primitives::{
    canonicalize_with, hash_canonized_proof, hash_mandatory, Canonicalizer, LabelingStrategy,
};
use serde_json::Value;
use tracing::debug;

use crate::error::{ProofValueError, SuiteError};
use crate::proof::{find_proof, read_proofs, strip_proof};
use crate::proof_value::{base_verify_data, parse_disclosure};

/// Verify a revealed document carrying a disclosure proof.
///
/// `resolve_key` maps the proof's `verificationMethod` to the issuer's
/// public key (the document-loader seam).
pub fn verify_derived<C, F>(
    canonicalizer: &C,
    document: &Value,
    resolve_key: F,
) -> Result<(), SuiteError>
where
    C: Canonicalizer,
    F: Fn(&str) -> Result<EcdsaVerifyingKey, String>,
{
    let proofs = read_proofs(document)?;
    let proof = find_proof(&proofs, None)?;
    let payload = parse_disclosure(proof)?;
    let unsecured = strip_proof(document);

    let proof_hash = hash_canonized_proof(
        canonicalizer,
        document.get("@context"),
        &proof.options_document()?,
    )?;

    // Canonicalize the revealed document through the disclosed label
    // map, reproducing the signer's statement spelling and order.
    let relabeled = canonicalize_with(
        canonicalizer,
        &unsecured,
        LabelingStrategy::Map(&payload.label_map),
    )?;
    let statements = relabeled.statements;

    // Partition by the disclosed relative mandatory indexes.
    let mandatory_indexes: BTreeSet<usize> = payload.mandatory_indexes.iter().copied().collect();
    if let Some(out_of_range) = mandatory_indexes.range(statements.len()..).next() {
        return Err(SuiteError::InvalidProofValue(ProofValueError::Field(
            format!("mandatory index {out_of_range} out of range"),
        )));
    }
    let mut mandatory: Vec<Statement> = Vec::with_capacity(mandatory_indexes.len());
    let mut non_mandatory: Vec<Statement> = Vec::new();
    for (index, statement) in statements.iter().enumerate() {
        if mandatory_indexes.contains(&index) {
            mandatory.push(statement.clone());
        } else {
            non_mandatory.push(statement.clone());
        }
    }
    debug!(
        statements = statements.len(),
        mandatory = mandatory.len(),
        signatures = payload.signatures.len(),
        "verifying disclosure"
    );

    // Signature-count invariant: catches added or removed statements
    // that try to reuse the original signatures.
    if payload.signatures.len() != non_mandatory.len() {
        return Err(SuiteError::SignatureCountMismatch {
            signatures: payload.signatures.len(),
            non_mandatory: non_mandatory.len(),
        });
    }

    // Per-statement signatures under the single-use key.
    let ephemeral = payload.public_key.to_verifying_key()?;
    for (statement, signature) in non_mandatory.iter().zip(&payload.signatures) {
        ephemeral
            .verify(&statement.to_bytes(), signature)
            .map_err(|_| SuiteError::InvalidSignature)?;
    }

    // Holder-binding signature over the recomputed commitment.
    let mandatory_hash = hash_mandatory(&mandatory);
    let to_verify = base_verify_data(&proof_hash, &payload.public_key, &mandatory_hash);
    let issuer = resolve_key(&proof.verification_method).map_err(SuiteError::KeyResolution)?;
    issuer
        .verify(&to_verify, &payload.base_signature)
        .map_err(|_| SuiteError::InvalidBaseSignature)
}
