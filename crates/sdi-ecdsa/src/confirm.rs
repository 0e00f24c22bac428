//! # Base proof confirmation
//!
//! Direct verification of a base proof, without deriving a disclosure:
//! re-derive the signer's statement sequence from the disclosed
//! label-derivation key, re-select the mandatory statements from the
//! disclosed pointers, and check the holder-binding signature plus every
//! per-statement signature. Used issuer-side and in tests; disclosure
//! verification is the production path.

use std::collections::BTreeMap;

use sdi_crypto::EcdsaVerifyingKey;
use sdi_primitives::{
    canonicalize_and_group, compile_pointers, hash_canonized_proof, hash_mandatory, Canonicalizer,
    LabelingStrategy,
};
use serde_json::Value;
use tracing::debug;

use crate::error::SuiteError;
use crate::proof::{find_proof, read_proofs, strip_proof};
use crate::proof_value::{base_verify_data, parse_base};

/// Verify a base proof on `document`.
///
/// `resolve_key` maps the proof's `verificationMethod` to the issuer's
/// public key.
pub fn confirm_base<C, F>(
    canonicalizer: &C,
    document: &Value,
    proof_id: Option<&str>,
    resolve_key: F,
) -> Result<(), SuiteError>
where
    C: Canonicalizer,
    F: Fn(&str) -> Result<EcdsaVerifyingKey, String>,
{
    let proofs = read_proofs(document)?;
    let proof = find_proof(&proofs, proof_id)?;
    let payload = parse_base(proof)?;
    let unsecured = strip_proof(document);

    let proof_hash = hash_canonized_proof(
        canonicalizer,
        document.get("@context"),
        &proof.options_document()?,
    )?;

    // Reproduce the signer's exact statement sequence from the disclosed
    // label-derivation key and mandatory pointers.
    let mandatory_filter = compile_pointers(&unsecured, &payload.mandatory_pointers, true)?;
    let mut filters = BTreeMap::new();
    filters.insert("mandatory".to_string(), mandatory_filter.as_ref());
    let output = canonicalize_and_group(
        canonicalizer,
        &unsecured,
        LabelingStrategy::Hmac(&payload.hmac_key),
        &filters,
    )?;
    let partition = &output.groups["mandatory"];
    let mandatory: Vec<_> = partition.matching.values().cloned().collect();
    let non_mandatory: Vec<_> = partition.non_matching.values().cloned().collect();
    debug!(
        statements = output.statements.len(),
        mandatory = mandatory.len(),
        "confirming base proof"
    );

    if payload.signatures.len() != non_mandatory.len() {
        return Err(SuiteError::SignatureCountMismatch {
            signatures: payload.signatures.len(),
            non_mandatory: non_mandatory.len(),
        });
    }

    let ephemeral = payload.public_key.to_verifying_key()?;
    for (statement, signature) in non_mandatory.iter().zip(&payload.signatures) {
        ephemeral
            .verify(&statement.to_bytes(), signature)
            .map_err(|_| SuiteError::InvalidSignature)?;
    }

    let mandatory_hash = hash_mandatory(&mandatory);
    let to_verify = base_verify_data(&proof_hash, &payload.public_key, &mandatory_hash);
    let issuer = resolve_key(&proof.verification_method).map_err(SuiteError::KeyResolution)?;
    issuer
        .verify(&to_verify, &payload.base_signature)
        .map_err(|_| SuiteError::InvalidBaseSignature)
}
