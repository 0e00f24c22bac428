//! # Base proof creation
//!
//! The signing path of the suite: canonicalize the document under a
//! fresh label-derivation key, partition statements by the mandatory
//! selection, sign every non-mandatory statement with a single-use key,
//! and bind proof metadata, single-use key, and mandatory content
//! together with one long-term signature over the commitment.
//!
//! Per-statement signing is what makes later disclosure possible: each
//! statement's authenticity is independently verifiable, and omitting a
//! statement's signature is indistinguishable from that statement never
//! having existed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand_core::{CryptoRng, RngCore};
use sdi_crypto::{EcdsaSignature, EcdsaSigningKey, HmacKey};
use sdi_primitives::{
    canonicalize_and_group, compile_pointers, hash_canonized_proof, hash_mandatory, Canonicalizer,
    LabelingStrategy,
};
use serde_json::Value;
use tracing::debug;

use crate::error::SuiteError;
use crate::proof::{append_proof, strip_proof, DataIntegrityProof, ProofPurpose, CRYPTOSUITE, PROOF_TYPE};
use crate::proof_value::{base_verify_data, encode_base, BaseProofPayload};

/// Immutable per-call signing configuration.
#[derive(Debug, Clone)]
pub struct SignOptions {
    /// Pointers naming statements that every future disclosure must
    /// reveal. May be empty.
    pub mandatory_pointers: Vec<String>,
    /// URL identifying the issuer's verification key.
    pub verification_method: String,
    /// The proof purpose to record.
    pub proof_purpose: ProofPurpose,
    /// Proof creation time; defaults to now.
    pub created: Option<DateTime<Utc>>,
    /// Optional proof id, useful when documents carry proof sets.
    pub proof_id: Option<String>,
}

impl SignOptions {
    /// Minimal options: assertion-method proof for `verification_method`
    /// with no mandatory pointers.
    pub fn new(verification_method: impl Into<String>) -> Self {
        Self {
            mandatory_pointers: Vec::new(),
            verification_method: verification_method.into(),
            proof_purpose: ProofPurpose::AssertionMethod,
            created: None,
            proof_id: None,
        }
    }
}

/// Produce a base proof over `document` and return the secured document.
///
/// The proof is appended to any existing proof set. The returned
/// document is the input plus the new proof; the input is not modified.
pub fn sign_base<C, R>(
    canonicalizer: &C,
    rng: &mut R,
    document: &Value,
    options: &SignOptions,
    issuer_key: &EcdsaSigningKey,
) -> Result<Value, SuiteError>
where
    C: Canonicalizer,
    R: CryptoRng + RngCore,
{
    let mut proof = DataIntegrityProof {
        id: options.proof_id.clone(),
        proof_type: PROOF_TYPE.to_string(),
        cryptosuite: CRYPTOSUITE.to_string(),
        created: options.created.unwrap_or_else(Utc::now),
        verification_method: options.verification_method.clone(),
        proof_purpose: options.proof_purpose,
        proof_value: None,
    };

    let unsecured = strip_proof(document);

    // The proof-options hash is independent of the statement pipeline;
    // only the final commitment joins the two.
    let proof_hash = hash_canonized_proof(
        canonicalizer,
        document.get("@context"),
        &proof.options_document()?,
    )?;

    // Fresh label-derivation key: canonical labels are randomized per
    // signing so proofs over similar documents do not correlate.
    let hmac_key = HmacKey::generate(rng);

    let mandatory_filter = compile_pointers(&unsecured, &options.mandatory_pointers, true)?;
    let mut filters = BTreeMap::new();
    filters.insert("mandatory".to_string(), mandatory_filter.as_ref());
    let output = canonicalize_and_group(
        canonicalizer,
        &unsecured,
        LabelingStrategy::Hmac(&hmac_key),
        &filters,
    )?;
    let partition = &output.groups["mandatory"];

    let mandatory: Vec<_> = partition.matching.values().cloned().collect();
    let non_mandatory: Vec<_> = partition.non_matching.values().cloned().collect();
    debug!(
        statements = output.statements.len(),
        mandatory = mandatory.len(),
        "signing statement sequence"
    );

    let mandatory_hash = hash_mandatory(&mandatory);

    // Single-use key pair for per-statement signatures, distinct from
    // the long-term issuer key.
    let ephemeral = EcdsaSigningKey::generate(rng);
    let public_key = ephemeral.verifying_key().public_key_bytes();
    let signatures: Vec<EcdsaSignature> = non_mandatory
        .iter()
        .map(|statement| ephemeral.sign(&statement.to_bytes()))
        .collect();

    let to_sign = base_verify_data(&proof_hash, &public_key, &mandatory_hash);
    let base_signature = issuer_key.sign(&to_sign);

    let payload = BaseProofPayload {
        base_signature,
        public_key,
        hmac_key,
        signatures,
        mandatory_pointers: options.mandatory_pointers.clone(),
    };
    proof.proof_value = Some(encode_base(&payload)?);

    append_proof(document, &proof)
}
