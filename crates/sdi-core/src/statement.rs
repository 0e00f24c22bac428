//! # Statement model
//!
//! An ordered quad of (subject, predicate, object, optional graph) in
//! canonical textual form. Statements are immutable once produced by
//! canonicalization; sequences of statements are order-significant and
//! sorted by the byte order of their serialized text.
//!
//! The textual form follows N-Quads conventions: `<iri>` for IRIs,
//! `_:label` for blank nodes, and `"value"` (with an optional
//! `^^<datatype>` suffix) for literals.

use std::cmp::Ordering;
use std::fmt;

/// A single component of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A named node, serialized as `<iri>`.
    Iri(String),
    /// A blank node. The label is stored without the `_:` prefix.
    Blank(String),
    /// A literal value with an optional datatype IRI.
    ///
    /// Plain string literals carry no datatype; typed literals serialize
    /// with a `^^<datatype>` suffix.
    Literal {
        value: String,
        datatype: Option<String>,
    },
}

impl Term {
    /// Returns the blank-node label, if this term is a blank node.
    pub fn blank_label(&self) -> Option<&str> {
        match self {
            Term::Blank(label) => Some(label),
            _ => None,
        }
    }

    /// Returns `true` if this term is a blank node.
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    fn write(&self, out: &mut String) {
        match self {
            Term::Iri(iri) => {
                out.push('<');
                out.push_str(iri);
                out.push('>');
            }
            Term::Blank(label) => {
                out.push_str("_:");
                out.push_str(label);
            }
            Term::Literal { value, datatype } => {
                out.push('"');
                escape_into(value, out);
                out.push('"');
                if let Some(dt) = datatype {
                    out.push_str("^^<");
                    out.push_str(dt);
                    out.push('>');
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        self.write(&mut s);
        f.write_str(&s)
    }
}

/// An immutable (subject, predicate, object, optional graph) quad.
///
/// Equality and ordering are defined over the serialized text, so sorting
/// a `Vec<Statement>` yields the canonical byte order directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Option<Term>,
}

impl Statement {
    /// Create a triple in the default graph.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }

    /// The serialized statement text, terminated with ` .`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.subject.write(&mut out);
        out.push(' ');
        self.predicate.write(&mut out);
        out.push(' ');
        self.object.write(&mut out);
        if let Some(graph) = &self.graph {
            out.push(' ');
            graph.write(&mut out);
        }
        out.push_str(" .");
        out
    }

    /// The serialized statement text as UTF-8 bytes (the unit that gets
    /// hashed and signed).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.text().into_bytes()
    }

    /// Iterate over the statement's terms in component order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .chain(self.graph.iter())
    }

    /// Returns `true` if any component is a blank node.
    pub fn has_blank(&self) -> bool {
        self.terms().any(Term::is_blank)
    }

    /// Produce a copy with every blank-node label replaced through `f`.
    ///
    /// Non-blank components are untouched. Used by label substitution and
    /// skolemization; callers re-sort afterwards because substitution can
    /// change relative order.
    pub fn map_blank_terms<F>(&self, mut f: F) -> Statement
    where
        F: FnMut(&str) -> Term,
    {
        let map = |term: &Term, f: &mut F| match term {
            Term::Blank(label) => f(label),
            other => other.clone(),
        };
        Statement {
            subject: map(&self.subject, &mut f),
            predicate: map(&self.predicate, &mut f),
            object: map(&self.object, &mut f),
            graph: self.graph.as_ref().map(|g| map(g, &mut f)),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl PartialOrd for Statement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Statement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text().cmp(&other.text())
    }
}

/// Sort a statement sequence into canonical (byte) order.
pub fn sort_statements(statements: &mut [Statement]) {
    statements.sort();
}

fn escape_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::Iri(s.to_string())
    }

    fn lit(s: &str) -> Term {
        Term::Literal {
            value: s.to_string(),
            datatype: None,
        }
    }

    #[test]
    fn triple_text_has_nquad_shape() {
        let stmt = Statement::new(iri("urn:s"), iri("urn:p"), lit("hello"));
        assert_eq!(stmt.text(), "<urn:s> <urn:p> \"hello\" .");
    }

    #[test]
    fn quad_text_includes_graph() {
        let mut stmt = Statement::new(iri("urn:s"), iri("urn:p"), lit("o"));
        stmt.graph = Some(iri("urn:g"));
        assert_eq!(stmt.text(), "<urn:s> <urn:p> \"o\" <urn:g> .");
    }

    #[test]
    fn blank_nodes_serialize_with_prefix() {
        let stmt = Statement::new(Term::Blank("c14n0".into()), iri("urn:p"), lit("v"));
        assert_eq!(stmt.text(), "_:c14n0 <urn:p> \"v\" .");
    }

    #[test]
    fn typed_literal_carries_datatype() {
        let stmt = Statement::new(
            iri("urn:s"),
            iri("urn:p"),
            Term::Literal {
                value: "42".into(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".into()),
            },
        );
        assert_eq!(
            stmt.text(),
            "<urn:s> <urn:p> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
        );
    }

    #[test]
    fn literal_escaping_covers_control_characters() {
        let stmt = Statement::new(iri("urn:s"), iri("urn:p"), lit("a\"b\\c\nd\re\tf"));
        assert_eq!(stmt.text(), "<urn:s> <urn:p> \"a\\\"b\\\\c\\nd\\re\\tf\" .");
    }

    #[test]
    fn ordering_follows_serialized_bytes() {
        let a = Statement::new(iri("urn:a"), iri("urn:p"), lit("1"));
        let b = Statement::new(iri("urn:b"), iri("urn:p"), lit("1"));
        let z = Statement::new(Term::Blank("x".into()), iri("urn:p"), lit("1"));
        let mut stmts = vec![z.clone(), b.clone(), a.clone()];
        sort_statements(&mut stmts);
        // '<' (0x3c) sorts before '_' (0x5f)
        assert_eq!(stmts, vec![a, b, z]);
    }

    #[test]
    fn map_blank_terms_replaces_every_blank_component() {
        let stmt = Statement::new(
            Term::Blank("b0".into()),
            iri("urn:p"),
            Term::Blank("b1".into()),
        );
        let mapped = stmt.map_blank_terms(|label| Term::Blank(format!("x-{label}")));
        assert_eq!(mapped.text(), "_:x-b0 <urn:p> _:x-b1 .");
    }

    #[test]
    fn map_blank_terms_can_skolemize_to_iris() {
        let stmt = Statement::new(Term::Blank("b0".into()), iri("urn:p"), lit("v"));
        let skolemized = stmt.map_blank_terms(|label| Term::Iri(format!("urn:bnid:{label}")));
        assert_eq!(skolemized.text(), "<urn:bnid:b0> <urn:p> \"v\" .");
        assert!(!skolemized.has_blank());
    }

    #[test]
    fn has_blank_detects_graph_component() {
        let mut stmt = Statement::new(iri("urn:s"), iri("urn:p"), lit("o"));
        assert!(!stmt.has_blank());
        stmt.graph = Some(Term::Blank("g".into()));
        assert!(stmt.has_blank());
    }
}
