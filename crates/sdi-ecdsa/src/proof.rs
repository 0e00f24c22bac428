//! # Data integrity proof structure
//!
//! The proof object attached to signed and revealed documents. The
//! envelope is rigid; serde rename attributes map between Rust
//! snake_case and the W3C JSON field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SuiteError;

/// The proof type attached by this suite.
pub const PROOF_TYPE: &str = "DataIntegrityProof";

/// The cryptosuite identifier.
pub const CRYPTOSUITE: &str = "ecdsa-sd-2023";

/// The purpose of a cryptographic proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the document's claims are true.
    AssertionMethod,
    /// Authentication of the document holder.
    Authentication,
}

impl std::fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofPurpose::AssertionMethod => write!(f, "assertionMethod"),
            ProofPurpose::Authentication => write!(f, "authentication"),
        }
    }
}

/// A data integrity proof carrying an ECDSA-SD proof value.
///
/// The same structure serves base proofs (on signed documents) and
/// derived proofs (on revealed documents); the two are told apart by the
/// tag prefix inside `proof_value`, never by inspecting this envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIntegrityProof {
    /// Optional proof identifier, used to disambiguate proof sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always `"DataIntegrityProof"`.
    #[serde(rename = "type")]
    pub proof_type: String,

    /// Always `"ecdsa-sd-2023"` for this suite.
    pub cryptosuite: String,

    /// When the proof was created (UTC).
    pub created: DateTime<Utc>,

    /// The verification method — a URL identifying the issuer's key.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// The purpose of this proof.
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,

    /// The multibase-encoded proof value. Absent only while the proof
    /// options are being hashed.
    #[serde(rename = "proofValue", default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

impl DataIntegrityProof {
    /// Returns `true` if this proof belongs to the ECDSA-SD suite.
    pub fn matches_suite(&self) -> bool {
        self.proof_type == PROOF_TYPE && self.cryptosuite == CRYPTOSUITE
    }

    /// The proof options document: this proof without its `proofValue`,
    /// used for the proof-options hash.
    pub fn options_document(&self) -> Result<Value, SuiteError> {
        let mut value = serde_json::to_value(self)
            .map_err(|e| SuiteError::Document(format!("proof serialization failed: {e}")))?;
        if let Some(map) = value.as_object_mut() {
            map.remove("proofValue");
        }
        Ok(value)
    }
}

/// Read the proof set from a document's `proof` property — a single
/// object or an array of objects.
pub fn read_proofs(document: &Value) -> Result<Vec<DataIntegrityProof>, SuiteError> {
    let Some(raw) = document.get("proof") else {
        return Ok(Vec::new());
    };
    let entries: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    entries
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry.clone())
                .map_err(|e| SuiteError::Document(format!("unreadable proof: {e}")))
        })
        .collect()
}

/// A copy of the document without its `proof` property.
pub fn strip_proof(document: &Value) -> Value {
    let mut stripped = document.clone();
    if let Some(map) = stripped.as_object_mut() {
        map.remove("proof");
    }
    stripped
}

/// A copy of the document with `proof` set to exactly `proof`.
pub fn with_proof(document: &Value, proof: &DataIntegrityProof) -> Result<Value, SuiteError> {
    let mut out = document.clone();
    let map: &mut Map<String, Value> = out
        .as_object_mut()
        .ok_or_else(|| SuiteError::Document("document root must be an object".into()))?;
    let value = serde_json::to_value(proof)
        .map_err(|e| SuiteError::Document(format!("proof serialization failed: {e}")))?;
    map.insert("proof".to_string(), value);
    Ok(out)
}

/// A copy of the document with `proof` appended to its existing proof
/// set: a document without proofs gains a single object, one with a
/// proof gains an array.
pub fn append_proof(document: &Value, proof: &DataIntegrityProof) -> Result<Value, SuiteError> {
    let mut out = document.clone();
    let map: &mut Map<String, Value> = out
        .as_object_mut()
        .ok_or_else(|| SuiteError::Document("document root must be an object".into()))?;
    let value = serde_json::to_value(proof)
        .map_err(|e| SuiteError::Document(format!("proof serialization failed: {e}")))?;
    match map.remove("proof") {
        None => {
            map.insert("proof".to_string(), value);
        }
        Some(Value::Array(mut items)) => {
            items.push(value);
            map.insert("proof".to_string(), Value::Array(items));
        }
        Some(single) => {
            map.insert("proof".to_string(), Value::Array(vec![single, value]));
        }
    }
    Ok(out)
}

/// Locate the proof to operate on within a proof set.
///
/// With an explicit `proof_id` the match is by id. Without one there
/// must be exactly one proof belonging to this suite; ambiguity is
/// fatal.
pub fn find_proof<'a>(
    proofs: &'a [DataIntegrityProof],
    proof_id: Option<&str>,
) -> Result<&'a DataIntegrityProof, SuiteError> {
    if let Some(id) = proof_id {
        return proofs
            .iter()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or(SuiteError::MissingProof);
    }
    let mut found = None;
    for proof in proofs.iter().filter(|p| p.matches_suite()) {
        if found.is_some() {
            return Err(SuiteError::AmbiguousProof);
        }
        found = Some(proof);
    }
    found.ok_or(SuiteError::MissingProof)
}
