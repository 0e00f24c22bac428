//! # Commitment hashing
//!
//! Two digests feed the signed commitment: the hash of the ordered
//! mandatory statements and the hash of the canonicalized proof options.
//! Both are computed identically at sign time and verify time and must
//! match bit for bit.

use sdi_core::Statement;
use sdi_crypto::{sha256, DIGEST_LENGTH};
use serde_json::Value;

use crate::canonicalize::Canonicalizer;
use crate::error::PrimitiveError;

/// Hash the ordered concatenation of statements, one per line.
///
/// The empty sequence hashes the empty byte string — the defined
/// sentinel for "no mandatory statements", contributed to the commitment
/// rather than omitted.
pub fn hash_mandatory(statements: &[Statement]) -> [u8; DIGEST_LENGTH] {
    sha256(&statement_bytes(statements))
}

/// Hash the canonicalized proof options: the proof object without its
/// `proofValue`, with the document's `@context` attached so terms resolve
/// the same way they do in the document itself.
pub fn hash_canonized_proof<C: Canonicalizer>(
    canonicalizer: &C,
    context: Option<&Value>,
    proof: &Value,
) -> Result<[u8; DIGEST_LENGTH], PrimitiveError> {
    let mut options = proof
        .as_object()
        .ok_or_else(|| PrimitiveError::MalformedDocument("proof must be an object".into()))?
        .clone();
    options.remove("proofValue");
    if let Some(context) = context {
        options.insert("@context".to_string(), context.clone());
    }
    let canonical = canonicalizer.canonicalize(&Value::Object(options))?;
    Ok(sha256(&statement_bytes(&canonical.statements)))
}

fn statement_bytes(statements: &[Statement]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for statement in statements {
        bytes.extend_from_slice(statement.text().as_bytes());
        bytes.push(b'\n');
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeCanonicalizer;
    use sdi_core::Term;
    use serde_json::json;

    fn stmt(value: &str) -> Statement {
        Statement::new(
            Term::Iri("urn:s".into()),
            Term::Iri("urn:p".into()),
            Term::Literal {
                value: value.into(),
                datatype: None,
            },
        )
    }

    #[test]
    fn empty_mandatory_set_hashes_the_empty_string() {
        let digest = hash_mandatory(&[]);
        assert_eq!(digest, sha256(b""));
    }

    #[test]
    fn mandatory_hash_is_order_sensitive() {
        let a = hash_mandatory(&[stmt("1"), stmt("2")]);
        let b = hash_mandatory(&[stmt("2"), stmt("1")]);
        assert_ne!(a, b);
    }

    #[test]
    fn mandatory_hash_is_concatenation_not_per_statement() {
        // splitting one statement's text across two must not collide
        let joined = hash_mandatory(&[stmt("ab")]);
        let split = hash_mandatory(&[stmt("a"), stmt("b")]);
        assert_ne!(joined, split);
    }

    #[test]
    fn proof_hash_ignores_proof_value() {
        let canonicalizer = TreeCanonicalizer::new();
        let with_value = json!({
            "type": "DataIntegrityProof",
            "cryptosuite": "ecdsa-sd-2023",
            "verificationMethod": "did:key:zIssuer#0",
            "proofPurpose": "assertionMethod",
            "proofValue": "u-something"
        });
        let mut without_value = with_value.clone();
        without_value.as_object_mut().unwrap().remove("proofValue");

        let a = hash_canonized_proof(&canonicalizer, None, &with_value).unwrap();
        let b = hash_canonized_proof(&canonicalizer, None, &without_value).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn proof_hash_binds_proof_metadata() {
        let canonicalizer = TreeCanonicalizer::new();
        let proof = json!({
            "type": "DataIntegrityProof",
            "cryptosuite": "ecdsa-sd-2023",
            "proofPurpose": "assertionMethod"
        });
        let mut altered = proof.clone();
        altered["proofPurpose"] = json!("authentication");
        let a = hash_canonized_proof(&canonicalizer, None, &proof).unwrap();
        let b = hash_canonized_proof(&canonicalizer, None, &altered).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn proof_hash_binds_document_context() {
        let canonicalizer = TreeCanonicalizer::new();
        let proof = json!({
            "type": "DataIntegrityProof",
            "cryptosuite": "ecdsa-sd-2023"
        });
        let ctx = json!({"@vocab": "https://example.com/#"});
        let a = hash_canonized_proof(&canonicalizer, Some(&ctx), &proof).unwrap();
        let b = hash_canonized_proof(&canonicalizer, None, &proof).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn non_object_proof_is_malformed() {
        let canonicalizer = TreeCanonicalizer::new();
        let err = hash_canonized_proof(&canonicalizer, None, &json!("proof")).unwrap_err();
        assert!(matches!(err, PrimitiveError::MalformedDocument(_)));
    }
}
