//! # Built-in tree-document canonicalizer
//!
//! Converts tree-shaped JSON documents into sorted statement sequences
//! with deterministic blank-node labels. This is the default
//! [`Canonicalizer`] collaborator; it covers the document shapes the
//! cryptosuite operates on (objects, arrays, scalar leaves, `id`/`type`
//! keywords, an optional term-map `@context`).
//!
//! ## Labeling
//!
//! Canonical labels are computed from the statement set, not from the
//! document walk: every blank node receives a signature by iterative
//! refinement (hash of its incident statements, with neighbor signatures
//! folded in each round), and `c14nN` labels are assigned in signature
//! order. Two inputs that differ only by a consistent relabeling of
//! blank nodes therefore canonicalize identically — the property the
//! disclosure label-map dance depends on. On tree-shaped data the
//! refinement separates every pair of non-automorphic nodes; structurally
//! identical siblings may swap labels, which leaves the sorted statement
//! set unchanged.

use std::collections::{BTreeMap, BTreeSet};

use sdi_core::{LabelMap, Statement, Term};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::canonicalize::{CanonicalDocument, Canonicalizer};
use crate::error::PrimitiveError;
use crate::skolem::SKOLEM_PREFIX;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

/// Fallback vocabulary for terms the context does not map.
const DEFAULT_VOCAB: &str = "urn:vocab:";

/// The built-in canonicalization collaborator for tree documents.
#[derive(Debug, Clone, Default)]
pub struct TreeCanonicalizer;

impl TreeCanonicalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Canonicalizer for TreeCanonicalizer {
    fn canonicalize(&self, document: &Value) -> Result<CanonicalDocument, PrimitiveError> {
        let root = as_object(document)?;
        let context = TermContext::parse(document)?;
        let mut walker = StatementWalker {
            context: &context,
            statements: Vec::new(),
            next_anon: 0,
        };
        let subject = walker.subject_term(root)?;
        walker.walk(root, &subject)?;
        let (statements, issued) = relabel_canonically(walker.statements);
        Ok(CanonicalDocument { statements, issued })
    }

    fn canonicalize_statements(
        &self,
        statements: &[Statement],
    ) -> Result<CanonicalDocument, PrimitiveError> {
        let (statements, issued) = relabel_canonically(statements.to_vec());
        Ok(CanonicalDocument { statements, issued })
    }

    fn skolemize_document(
        &self,
        document: &Value,
        labels: &LabelMap,
    ) -> Result<Value, PrimitiveError> {
        let root = as_object(document)?;
        let mut next_anon = 0usize;
        skolemize_node(root, labels, &mut next_anon)
    }
}

// ---------------------------------------------------------------------------
// Term resolution
// ---------------------------------------------------------------------------

/// Term→IRI resolution rules derived from the document's `@context`.
///
/// Only the term-map form is interpreted (string entries plus `@vocab`);
/// remote context URI strings are opaque and pass through untouched.
struct TermContext {
    terms: BTreeMap<String, String>,
    vocab: String,
}

impl TermContext {
    fn parse(document: &Value) -> Result<Self, PrimitiveError> {
        let mut context = TermContext {
            terms: BTreeMap::new(),
            vocab: DEFAULT_VOCAB.to_string(),
        };
        match document.get("@context") {
            None | Some(Value::String(_)) => {}
            Some(Value::Object(map)) => context.merge(map)?,
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(_) => {}
                        Value::Object(map) => context.merge(map)?,
                        other => {
                            return Err(PrimitiveError::MalformedDocument(format!(
                                "unsupported @context entry: {other}"
                            )))
                        }
                    }
                }
            }
            Some(other) => {
                return Err(PrimitiveError::MalformedDocument(format!(
                    "unsupported @context value: {other}"
                )))
            }
        }
        Ok(context)
    }

    fn merge(&mut self, map: &Map<String, Value>) -> Result<(), PrimitiveError> {
        for (term, value) in map {
            let iri = match value {
                Value::String(iri) => iri.clone(),
                Value::Object(entry) => match entry.get("@id") {
                    Some(Value::String(iri)) => iri.clone(),
                    _ => {
                        return Err(PrimitiveError::MalformedDocument(format!(
                            "context term {term:?} has no IRI mapping"
                        )))
                    }
                },
                _ => {
                    return Err(PrimitiveError::MalformedDocument(format!(
                        "context term {term:?} must map to an IRI string"
                    )))
                }
            };
            if term == "@vocab" {
                self.vocab = iri;
            } else {
                self.terms.insert(term.clone(), iri);
            }
        }
        Ok(())
    }

    fn resolve(&self, term: &str) -> String {
        if let Some(iri) = self.terms.get(term) {
            iri.clone()
        } else if term.contains(':') {
            term.to_string()
        } else {
            format!("{}{}", self.vocab, term)
        }
    }
}

// ---------------------------------------------------------------------------
// Document → statements
// ---------------------------------------------------------------------------

struct StatementWalker<'a> {
    context: &'a TermContext,
    statements: Vec<Statement>,
    next_anon: usize,
}

impl StatementWalker<'_> {
    /// The subject term for an object node: its `id` if present, else a
    /// fresh anonymous blank label in walk order.
    fn subject_term(&mut self, node: &Map<String, Value>) -> Result<Term, PrimitiveError> {
        match node.get("id") {
            Some(Value::String(id)) => match id.strip_prefix("_:") {
                Some(label) => Ok(Term::Blank(label.to_string())),
                None => Ok(Term::Iri(id.clone())),
            },
            Some(other) => Err(PrimitiveError::MalformedDocument(format!(
                "id must be a string, got {other}"
            ))),
            None => {
                let label = format!("anon{}", self.next_anon);
                self.next_anon += 1;
                Ok(Term::Blank(label))
            }
        }
    }

    fn walk(&mut self, node: &Map<String, Value>, subject: &Term) -> Result<(), PrimitiveError> {
        for (key, value) in node {
            match key.as_str() {
                "@context" | "id" => {}
                "type" => self.emit_types(subject, value)?,
                _ => {
                    let predicate = Term::Iri(self.context.resolve(key));
                    self.emit_value(subject, &predicate, value, false)?;
                }
            }
        }
        Ok(())
    }

    fn emit_types(&mut self, subject: &Term, value: &Value) -> Result<(), PrimitiveError> {
        let types: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        for entry in types {
            let Value::String(name) = entry else {
                return Err(PrimitiveError::MalformedDocument(format!(
                    "type must be a string, got {entry}"
                )));
            };
            self.statements.push(Statement::new(
                subject.clone(),
                Term::Iri(RDF_TYPE.to_string()),
                Term::Iri(self.context.resolve(name)),
            ));
        }
        Ok(())
    }

    fn emit_value(
        &mut self,
        subject: &Term,
        predicate: &Term,
        value: &Value,
        in_array: bool,
    ) -> Result<(), PrimitiveError> {
        match value {
            Value::Null => Ok(()),
            Value::Bool(b) => {
                self.push_literal(subject, predicate, b.to_string(), Some(XSD_BOOLEAN));
                Ok(())
            }
            Value::Number(n) => {
                let datatype = if n.is_f64() { XSD_DOUBLE } else { XSD_INTEGER };
                self.push_literal(subject, predicate, n.to_string(), Some(datatype));
                Ok(())
            }
            Value::String(s) => {
                self.push_literal(subject, predicate, s.clone(), None);
                Ok(())
            }
            Value::Array(items) => {
                if in_array {
                    return Err(PrimitiveError::NestedArrays);
                }
                for item in items {
                    self.emit_value(subject, predicate, item, true)?;
                }
                Ok(())
            }
            Value::Object(node) => {
                let object = self.subject_term(node)?;
                self.statements.push(Statement::new(
                    subject.clone(),
                    predicate.clone(),
                    object.clone(),
                ));
                self.walk(node, &object)
            }
        }
    }

    fn push_literal(
        &mut self,
        subject: &Term,
        predicate: &Term,
        value: String,
        datatype: Option<&str>,
    ) {
        self.statements.push(Statement::new(
            subject.clone(),
            predicate.clone(),
            Term::Literal {
                value,
                datatype: datatype.map(str::to_string),
            },
        ));
    }
}

// ---------------------------------------------------------------------------
// Document skolemization
// ---------------------------------------------------------------------------

/// Rebuild `node` with every blank node carrying an explicit
/// `urn:bnid:<final label>` identifier.
///
/// The traversal assigns anonymous labels in exactly the same order as
/// [`StatementWalker`], so `labels` (document-internal → final) resolves
/// every node encountered here.
fn skolemize_node(
    node: &Map<String, Value>,
    labels: &LabelMap,
    next_anon: &mut usize,
) -> Result<Value, PrimitiveError> {
    let mut out = Map::new();
    match node.get("id") {
        Some(Value::String(id)) => match id.strip_prefix("_:") {
            Some(label) => {
                out.insert("id".to_string(), Value::String(skolem_iri(labels, label)?));
            }
            None => {
                out.insert("id".to_string(), Value::String(id.clone()));
            }
        },
        Some(other) => {
            return Err(PrimitiveError::MalformedDocument(format!(
                "id must be a string, got {other}"
            )))
        }
        None => {
            let label = format!("anon{next_anon}");
            *next_anon += 1;
            out.insert("id".to_string(), Value::String(skolem_iri(labels, &label)?));
        }
    }
    for (key, value) in node {
        if key == "id" {
            continue;
        }
        if key == "@context" {
            out.insert(key.clone(), value.clone());
            continue;
        }
        out.insert(key.clone(), skolemize_value(value, labels, next_anon, false)?);
    }
    Ok(Value::Object(out))
}

fn skolemize_value(
    value: &Value,
    labels: &LabelMap,
    next_anon: &mut usize,
    in_array: bool,
) -> Result<Value, PrimitiveError> {
    match value {
        Value::Array(items) => {
            if in_array {
                return Err(PrimitiveError::NestedArrays);
            }
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(skolemize_value(item, labels, next_anon, true)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(node) => skolemize_node(node, labels, next_anon),
        scalar => Ok(scalar.clone()),
    }
}

fn skolem_iri(labels: &LabelMap, label: &str) -> Result<String, PrimitiveError> {
    let final_label = labels
        .get(label)
        .ok_or_else(|| PrimitiveError::MissingLabel(label.to_string()))?;
    Ok(format!("{SKOLEM_PREFIX}{final_label}"))
}

// ---------------------------------------------------------------------------
// Canonical relabeling
// ---------------------------------------------------------------------------

/// Assign `c14nN` labels to the blank nodes of a statement set.
///
/// Signatures start from each node's incident statements (with blank
/// labels masked) and fold in neighbor signatures each round, so the
/// final ordering depends only on graph structure. Returns the sorted,
/// relabeled statements and the input-label → canonical-label map.
fn relabel_canonically(statements: Vec<Statement>) -> (Vec<Statement>, LabelMap) {
    let mut labels: BTreeSet<String> = BTreeSet::new();
    for stmt in &statements {
        for term in stmt.terms() {
            if let Some(label) = term.blank_label() {
                labels.insert(label.to_string());
            }
        }
    }
    if labels.is_empty() {
        let mut statements = statements;
        statements.sort();
        return (statements, LabelMap::new());
    }

    // First-degree signatures: incident statements with self masked as
    // `_:a` and every other blank node as `_:z`.
    let mut signatures: BTreeMap<String, [u8; 32]> = labels
        .iter()
        .map(|label| (label.clone(), node_signature(label, &statements, None)))
        .collect();

    // Refine until every node is separated; one round propagates one
    // hop, so n rounds cover any tree.
    for _ in 0..labels.len() {
        let distinct: BTreeSet<&[u8; 32]> = signatures.values().collect();
        if distinct.len() == labels.len() {
            break;
        }
        signatures = labels
            .iter()
            .map(|label| {
                (
                    label.clone(),
                    node_signature(label, &statements, Some(&signatures)),
                )
            })
            .collect();
    }

    // Canonical order: by signature; remaining ties are automorphic and
    // may be broken arbitrarily without changing the statement set.
    let mut ordered: Vec<&String> = labels.iter().collect();
    ordered.sort_by(|a, b| signatures[*a].cmp(&signatures[*b]).then(a.cmp(b)));

    let mut issued = LabelMap::new();
    for (index, label) in ordered.iter().enumerate() {
        // labels are unique on both sides by construction
        let _ = issued.insert((*label).clone(), format!("c14n{index}"));
    }

    let mut relabeled: Vec<Statement> = statements
        .iter()
        .map(|stmt| {
            stmt.map_blank_terms(|label| {
                let canonical = issued.get(label).unwrap_or(label);
                Term::Blank(canonical.to_string())
            })
        })
        .collect();
    relabeled.sort();
    (relabeled, issued)
}

/// Hash a node's incident statements, oriented around the node itself.
fn node_signature(
    label: &str,
    statements: &[Statement],
    neighbor_signatures: Option<&BTreeMap<String, [u8; 32]>>,
) -> [u8; 32] {
    let mut lines: Vec<String> = statements
        .iter()
        .filter(|stmt| stmt.terms().any(|t| t.blank_label() == Some(label)))
        .map(|stmt| {
            stmt.map_blank_terms(|other| {
                if other == label {
                    Term::Blank("a".to_string())
                } else {
                    match neighbor_signatures.and_then(|sigs| sigs.get(other)) {
                        Some(sig) => Term::Blank(hex(sig)),
                        None => Term::Blank("z".to_string()),
                    }
                }
            })
            .text()
        })
        .collect();
    lines.sort();

    let mut hasher = Sha256::new();
    if let Some(sigs) = neighbor_signatures {
        if let Some(own) = sigs.get(label) {
            hasher.update(own);
        }
    }
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().into()
}

fn hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn as_object(document: &Value) -> Result<&Map<String, Value>, PrimitiveError> {
    document
        .as_object()
        .ok_or_else(|| PrimitiveError::MalformedDocument("document root must be an object".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonicalize(doc: &Value) -> CanonicalDocument {
        TreeCanonicalizer::new().canonicalize(doc).unwrap()
    }

    fn texts(statements: &[Statement]) -> Vec<String> {
        statements.iter().map(Statement::text).collect()
    }

    #[test]
    fn flat_document_produces_sorted_statements() {
        let doc = json!({"name": "Alice", "age": 30});
        let canonical = canonicalize(&doc);
        assert_eq!(
            texts(&canonical.statements),
            vec![
                "_:c14n0 <urn:vocab:age> \"30\"^^<http://www.w3.org/2001/XMLSchema#integer> .",
                "_:c14n0 <urn:vocab:name> \"Alice\" .",
            ]
        );
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let doc = json!({
            "type": ["VerifiableCredential"],
            "credentialSubject": {
                "id": "urn:x",
                "driverLicense": {"dateOfBirth": "01-01-1990", "expirationDate": "01-01-2030"}
            }
        });
        let a = canonicalize(&doc);
        let b = canonicalize(&doc);
        assert_eq!(a.statements, b.statements);
    }

    #[test]
    fn named_nodes_use_their_id() {
        let doc = json!({"id": "urn:root", "value": 1});
        let canonical = canonicalize(&doc);
        assert_eq!(
            texts(&canonical.statements),
            vec!["<urn:root> <urn:vocab:value> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> ."]
        );
        assert!(canonical.issued.is_empty());
    }

    #[test]
    fn type_values_become_rdf_type_statements() {
        let doc = json!({"id": "urn:s", "type": ["VerifiableCredential", "urn:custom:Type"]});
        let canonical = canonicalize(&doc);
        assert_eq!(
            texts(&canonical.statements),
            vec![
                "<urn:s> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <urn:custom:Type> .",
                "<urn:s> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <urn:vocab:VerifiableCredential> .",
            ]
        );
    }

    #[test]
    fn context_term_map_resolves_predicates() {
        let doc = json!({
            "@context": {"name": "https://schema.org/name", "@vocab": "https://example.com/#"},
            "id": "urn:s",
            "name": "Alice",
            "other": "x"
        });
        let canonical = canonicalize(&doc);
        assert_eq!(
            texts(&canonical.statements),
            vec![
                "<urn:s> <https://example.com/#other> \"x\" .",
                "<urn:s> <https://schema.org/name> \"Alice\" .",
            ]
        );
    }

    #[test]
    fn remote_context_strings_are_opaque() {
        let doc = json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "id": "urn:s",
            "claim": true
        });
        let canonical = canonicalize(&doc);
        assert_eq!(
            texts(&canonical.statements),
            vec!["<urn:s> <urn:vocab:claim> \"true\"^^<http://www.w3.org/2001/XMLSchema#boolean> ."]
        );
    }

    #[test]
    fn context_term_without_iri_is_malformed() {
        let doc = json!({"@context": {"bad": 7}, "bad": "x"});
        let err = TreeCanonicalizer::new().canonicalize(&doc).unwrap_err();
        assert!(matches!(err, PrimitiveError::MalformedDocument(_)));
    }

    #[test]
    fn array_elements_emit_one_statement_each_in_order_significant_form() {
        let doc = json!({"id": "urn:s", "tags": ["b", "a"]});
        let canonical = canonicalize(&doc);
        // statement text is identical per value; order comes from sorting
        assert_eq!(
            texts(&canonical.statements),
            vec![
                "<urn:s> <urn:vocab:tags> \"a\" .",
                "<urn:s> <urn:vocab:tags> \"b\" .",
            ]
        );
    }

    #[test]
    fn nested_arrays_are_rejected() {
        let doc = json!({"id": "urn:s", "grid": [[1, 2]]});
        let err = TreeCanonicalizer::new().canonicalize(&doc).unwrap_err();
        assert!(matches!(err, PrimitiveError::NestedArrays));
    }

    #[test]
    fn null_values_are_dropped() {
        let doc = json!({"id": "urn:s", "gone": null, "kept": 1});
        let canonical = canonicalize(&doc);
        assert_eq!(canonical.statements.len(), 1);
    }

    #[test]
    fn non_object_root_is_malformed() {
        let err = TreeCanonicalizer::new()
            .canonicalize(&json!(["a", "b"]))
            .unwrap_err();
        assert!(matches!(err, PrimitiveError::MalformedDocument(_)));
    }

    #[test]
    fn labeling_is_stable_under_consistent_relabeling() {
        // same structure arriving with different input labels must yield
        // identical canonical statements
        let doc = json!({
            "a": {"x": {"v": 1}},
            "b": {"x": {"v": 2}}
        });
        let canonical = canonicalize(&doc);
        let relabeled: Vec<Statement> = canonical
            .statements
            .iter()
            .map(|s| s.map_blank_terms(|l| Term::Blank(format!("zz-{l}"))))
            .collect();
        let again = TreeCanonicalizer::new()
            .canonicalize_statements(&relabeled)
            .unwrap();
        assert_eq!(texts(&again.statements), texts(&canonical.statements));
    }

    #[test]
    fn sibling_subtrees_with_distinct_leaves_get_distinct_labels() {
        let doc = json!({
            "left": {"v": 1},
            "right": {"v": 2}
        });
        let canonical = canonicalize(&doc);
        // root + two children = three blank nodes, all separated
        assert_eq!(canonical.issued.len(), 3);
        let labels: BTreeSet<&str> = canonical
            .statements
            .iter()
            .flat_map(|s| s.terms().filter_map(Term::blank_label))
            .collect();
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn issued_map_covers_every_anonymous_node() {
        let doc = json!({
            "credentialSubject": {"driverLicense": {"dateOfBirth": "x"}}
        });
        let canonical = canonicalize(&doc);
        // root and driverLicense are anonymous; credentialSubject node too
        assert_eq!(canonical.issued.len(), 3);
        assert!(canonical.issued.get("anon0").is_some());
    }

    #[test]
    fn skolemize_document_assigns_bnid_ids_in_walk_order() {
        let canonicalizer = TreeCanonicalizer::new();
        let doc = json!({
            "credentialSubject": {"id": "urn:x", "license": {"dob": "d"}}
        });
        let canonical = canonicalizer.canonicalize(&doc).unwrap();
        let skolemized = canonicalizer
            .skolemize_document(&doc, &canonical.issued)
            .unwrap();

        let root_id = skolemized["id"].as_str().unwrap();
        assert!(root_id.starts_with(SKOLEM_PREFIX));
        assert_eq!(skolemized["credentialSubject"]["id"], "urn:x");
        let license_id = skolemized["credentialSubject"]["license"]["id"]
            .as_str()
            .unwrap();
        assert!(license_id.starts_with(SKOLEM_PREFIX));
        assert_ne!(root_id, license_id);
    }

    #[test]
    fn skolemized_document_canonicalizes_to_skolemized_statements() {
        // canonicalize(skolemize(doc)) must equal skolemize(canonicalize(doc))
        let canonicalizer = TreeCanonicalizer::new();
        let doc = json!({
            "type": ["VerifiableCredential"],
            "credentialSubject": {"id": "urn:x", "license": {"dob": "d", "exp": "e"}}
        });
        let canonical = canonicalizer.canonicalize(&doc).unwrap();
        let skolemized_doc = canonicalizer
            .skolemize_document(&doc, &canonical.issued)
            .unwrap();
        let from_doc = canonicalizer.canonicalize(&skolemized_doc).unwrap();
        let direct = crate::skolem::skolemize_statements(&canonical.statements);
        let mut direct_sorted = direct;
        direct_sorted.sort();
        assert_eq!(texts(&from_doc.statements), texts(&direct_sorted));
    }

    #[test]
    fn authored_blank_ids_are_respected() {
        let doc = json!({
            "id": "_:root",
            "child": {"id": "_:kid", "v": 1}
        });
        let canonical = canonicalize(&doc);
        assert!(canonical.issued.get("root").is_some());
        assert!(canonical.issued.get("kid").is_some());
    }

    #[test]
    fn float_literals_use_double_datatype() {
        let doc = json!({"id": "urn:s", "score": 2.5});
        let canonical = canonicalize(&doc);
        assert_eq!(
            texts(&canonical.statements),
            vec!["<urn:s> <urn:vocab:score> \"2.5\"^^<http://www.w3.org/2001/XMLSchema#double> ."]
        );
    }
}
