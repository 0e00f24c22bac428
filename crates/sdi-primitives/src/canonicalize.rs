//! # Canonicalization seam and blank-node relabeling
//!
//! [`Canonicalizer`] is the collaborator boundary around the dataset
//! canonicalization algorithm: a black-box function mapping a document to
//! a canonical, sorted statement sequence with deterministic blank-node
//! labels. The built-in implementation is
//! [`TreeCanonicalizer`](crate::tree::TreeCanonicalizer); a full RDF
//! dataset canonicalizer can be plugged in without touching the rest of
//! the pipeline.
//!
//! On top of the seam, [`canonicalize_with`] applies a
//! [`LabelingStrategy`]: canonical labels are kept as-is, replaced by a
//! keyed pseudorandom function of themselves, or replaced through a
//! supplied label map. Substitution can change relative statement order,
//! so the sequence is re-sorted afterwards.
//!
//! The label substitutions themselves are three independent pure
//! mapping functions, kept separate from the statement plumbing so each
//! can be tested on its own.

use sdi_core::{LabelMap, Statement, Term};
use sdi_crypto::{hmac_sha256, HmacKey};
use serde_json::Value;

use crate::error::PrimitiveError;

/// A canonicalized document or statement set.
#[derive(Debug, Clone)]
pub struct CanonicalDocument {
    /// Sorted statements carrying canonical (`c14nN`) blank-node labels.
    pub statements: Vec<Statement>,
    /// Input blank-node label → canonical label.
    ///
    /// For a document input, the source side holds the document-internal
    /// labels the canonicalizer assigned while walking; for a statement
    /// input, it holds the labels the statements arrived with.
    pub issued: LabelMap,
}

/// The dataset canonicalization collaborator.
pub trait Canonicalizer {
    /// Canonicalize a document into a sorted statement sequence.
    fn canonicalize(&self, document: &Value) -> Result<CanonicalDocument, PrimitiveError>;

    /// Canonicalize an existing statement set, relabeling its blank nodes
    /// canonically. The result is independent of the labels the input
    /// arrived with (only their structure matters).
    fn canonicalize_statements(
        &self,
        statements: &[Statement],
    ) -> Result<CanonicalDocument, PrimitiveError>;

    /// Produce a copy of `document` in which every blank node carries an
    /// explicit `urn:bnid:` identifier, resolved through `labels`
    /// (document-internal label → final label).
    fn skolemize_document(
        &self,
        document: &Value,
        labels: &LabelMap,
    ) -> Result<Value, PrimitiveError>;
}

/// How blank-node labels are substituted after canonicalization.
#[derive(Debug, Clone, Copy)]
pub enum LabelingStrategy<'a> {
    /// Keep the raw canonical labels.
    None,
    /// Replace each canonical label with a keyed pseudorandom function of
    /// itself (deterministic under a fixed key).
    Hmac(&'a HmacKey),
    /// Replace labels through a supplied canonical→stable map. A label
    /// without a mapping is fatal.
    Map(&'a LabelMap),
}

/// A canonicalized sequence after label substitution.
#[derive(Debug, Clone)]
pub struct RelabeledDocument {
    /// Sorted statements carrying the substituted labels.
    pub statements: Vec<Statement>,
    /// Document-internal label → substituted label.
    pub issued: LabelMap,
    /// Canonical (`c14nN`) label → substituted label.
    pub substitution: LabelMap,
}

/// The keyed label substitution: `u<base64url-nopad(HMAC-SHA-256(key, label))>`.
///
/// Deterministic under a fixed key, so the signer and any holder who
/// learns the key derive identical statement sequences, while different
/// signings of similar documents stay uncorrelated.
pub fn hmac_label(key: &HmacKey, label: &str) -> String {
    let mac = hmac_sha256(key, label.as_bytes());
    multibase::encode(multibase::Base::Base64Url, mac)
}

/// The map-based label substitution. Fatal if `label` has no entry.
pub fn map_label(map: &LabelMap, label: &str) -> Result<String, PrimitiveError> {
    map.get(label)
        .map(str::to_string)
        .ok_or_else(|| PrimitiveError::MissingLabel(label.to_string()))
}

/// Canonicalize `document` and substitute blank-node labels per
/// `strategy`, re-sorting the statements afterwards.
pub fn canonicalize_with<C: Canonicalizer>(
    canonicalizer: &C,
    document: &Value,
    strategy: LabelingStrategy<'_>,
) -> Result<RelabeledDocument, PrimitiveError> {
    let canonical = canonicalizer.canonicalize(document)?;

    // Build the canonical→substituted map over the labels actually used.
    let mut substitution = LabelMap::new();
    for stmt in &canonical.statements {
        for term in stmt.terms() {
            let Some(label) = term.blank_label() else {
                continue;
            };
            if substitution.get(label).is_some() {
                continue;
            }
            let replacement = match strategy {
                LabelingStrategy::None => label.to_string(),
                LabelingStrategy::Hmac(key) => hmac_label(key, label),
                LabelingStrategy::Map(map) => map_label(map, label)?,
            };
            substitution.insert(label, replacement)?;
        }
    }

    let mut statements: Vec<Statement> = canonical
        .statements
        .iter()
        .map(|stmt| {
            stmt.map_blank_terms(|label| {
                // every blank label was just walked above
                let replacement = substitution.get(label).unwrap_or(label);
                Term::Blank(replacement.to_string())
            })
        })
        .collect();
    statements.sort();

    let issued = canonical.issued.compose(&substitution);
    Ok(RelabeledDocument {
        statements,
        issued,
        substitution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_label_is_multibase_base64url() {
        let key = HmacKey::from_bytes(&[3u8; 32]).unwrap();
        let label = hmac_label(&key, "c14n0");
        assert!(label.starts_with('u'));
        // 32 MAC bytes → 43 base64url characters, no padding
        assert_eq!(label.len(), 44);
        assert!(!label.contains('='));
    }

    #[test]
    fn hmac_label_is_deterministic_and_key_sensitive() {
        let a = HmacKey::from_bytes(&[1u8; 32]).unwrap();
        let b = HmacKey::from_bytes(&[2u8; 32]).unwrap();
        assert_eq!(hmac_label(&a, "c14n0"), hmac_label(&a, "c14n0"));
        assert_ne!(hmac_label(&a, "c14n0"), hmac_label(&b, "c14n0"));
        assert_ne!(hmac_label(&a, "c14n0"), hmac_label(&a, "c14n1"));
    }

    #[test]
    fn map_label_missing_entry_is_fatal() {
        let map = LabelMap::new();
        let err = map_label(&map, "c14n9").unwrap_err();
        assert!(matches!(err, PrimitiveError::MissingLabel(_)));
    }

    #[test]
    fn map_label_resolves_present_entry() {
        let mut map = LabelMap::new();
        map.insert("c14n0", "stable0").unwrap();
        assert_eq!(map_label(&map, "c14n0").unwrap(), "stable0");
    }
}
