//! # Disclosure derivation
//!
//! The holder-side operation: given a document carrying a base proof and
//! a set of selective pointers, produce the revealed document with a
//! derived proof — a filtered subset of the per-statement signatures,
//! the compact label map a verifier needs to reproduce the signer's
//! statement ordering, and the positions of mandatory statements within
//! the revealed sequence. No signing key is involved.

use sdi_primitives::{
    canonicalize_with, compile_pointers, filter_and_group, project, Canonicalizer,
    LabelingStrategy,
};
use serde_json::Value;
use tracing::debug;

use crate::error::SuiteError;
use crate::proof::{find_proof, read_proofs, strip_proof, with_proof};
use crate::proof_value::{encode_disclosure, parse_base, DisclosureProofPayload};

/// Immutable per-call disclosure configuration.
#[derive(Debug, Clone, Default)]
pub struct DiscloseOptions {
    /// Pointers naming the statements the holder chooses to reveal, on
    /// top of the signer's mandatory selection.
    pub selective_pointers: Vec<String>,
    /// Which base proof to derive from, when the document carries a
    /// proof set. Without it, exactly one suite proof must match.
    pub proof_id: Option<String>,
}

impl DiscloseOptions {
    /// Select the given pointers, deriving from the document's single
    /// base proof.
    pub fn select(pointers: &[&str]) -> Self {
        Self {
            selective_pointers: pointers.iter().map(|p| p.to_string()).collect(),
            proof_id: None,
        }
    }
}

/// Derive a revealed document with a disclosure proof.
///
/// Fails with [`SuiteError::NothingSelected`] when both the mandatory
/// and the selective selections are empty — disclosing zero statements
/// is never valid.
pub fn derive<C>(
    canonicalizer: &C,
    document: &Value,
    options: &DiscloseOptions,
) -> Result<Value, SuiteError>
where
    C: Canonicalizer,
{
    let proofs = read_proofs(document)?;
    let base_proof = find_proof(&proofs, options.proof_id.as_deref())?;
    let payload = parse_base(base_proof)?;
    let unsecured = strip_proof(document);

    // Combined selection: the signer's mandatory pointers plus the
    // holder's selective pointers.
    let mut combined_pointers = payload.mandatory_pointers.clone();
    combined_pointers.extend(options.selective_pointers.iter().cloned());

    let mandatory_filter = compile_pointers(&unsecured, &payload.mandatory_pointers, true)?;
    let combined_filter = compile_pointers(&unsecured, &combined_pointers, true)?;
    let Some(combined_filter) = combined_filter else {
        return Err(SuiteError::NothingSelected);
    };

    // Re-derive the signer's exact statement sequence from the disclosed
    // label-derivation key.
    let relabeled = canonicalize_with(
        canonicalizer,
        &unsecured,
        LabelingStrategy::Hmac(&payload.hmac_key),
    )?;
    let skolemized = canonicalizer.skolemize_document(&unsecured, &relabeled.issued)?;

    let groups = filter_and_group(
        canonicalizer,
        &relabeled.statements,
        &skolemized,
        &combined_filter,
        mandatory_filter.as_ref(),
    )?;
    debug!(
        statements = relabeled.statements.len(),
        revealed = groups.reveal_statements.len(),
        mandatory = groups.mandatory_relative.len(),
        "deriving disclosure"
    );

    // One base signature per non-mandatory statement, in canonical
    // order; keep exactly those whose statement survives into the
    // combined selection.
    let non_mandatory_indexes: Vec<usize> = (0..relabeled.statements.len())
        .filter(|index| !groups.mandatory_absolute.contains_key(index))
        .collect();
    if payload.signatures.len() != non_mandatory_indexes.len() {
        return Err(SuiteError::SignatureCountMismatch {
            signatures: payload.signatures.len(),
            non_mandatory: non_mandatory_indexes.len(),
        });
    }
    let filtered_signatures = non_mandatory_indexes
        .iter()
        .zip(&payload.signatures)
        .filter(|(index, _)| groups.combined.matching.contains_key(*index))
        .map(|(_, signature)| signature.clone())
        .collect();

    let reveal_document = project(&unsecured, &combined_filter)?;

    let disclosure = DisclosureProofPayload {
        base_signature: payload.base_signature,
        public_key: payload.public_key,
        signatures: filtered_signatures,
        label_map: groups.label_map,
        mandatory_indexes: groups.mandatory_relative,
    };

    let mut derived_proof = base_proof.clone();
    derived_proof.proof_value = Some(encode_disclosure(&disclosure)?);
    with_proof(&reveal_document, &derived_proof)
}
