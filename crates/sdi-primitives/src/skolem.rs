//! # Statement skolemization
//!
//! Blank nodes cannot survive projection: re-framing a document assigns
//! fresh labels, which would break the positional matching the grouper
//! relies on. Skolemization sidesteps this by turning every blank node
//! into a stable `urn:bnid:` IRI before projection and back afterwards,
//! so projected statements stay textually identical to the originals.

use sdi_core::{Statement, Term};

/// IRI scheme prefix used for skolemized blank nodes.
pub const SKOLEM_PREFIX: &str = "urn:bnid:";

/// Replace every blank node `_:label` with the IRI `urn:bnid:label`.
pub fn skolemize_statements(statements: &[Statement]) -> Vec<Statement> {
    statements
        .iter()
        .map(|stmt| stmt.map_blank_terms(|label| Term::Iri(format!("{SKOLEM_PREFIX}{label}"))))
        .collect()
}

/// Replace every `urn:bnid:label` IRI back with the blank node `_:label`.
///
/// The output is re-sorted by the caller when order matters: swapping the
/// `<urn:bnid:…>` spelling for `_:…` changes byte order.
pub fn deskolemize_statements(statements: &[Statement]) -> Vec<Statement> {
    statements.iter().map(deskolemize_statement).collect()
}

fn deskolemize_statement(statement: &Statement) -> Statement {
    let map = |term: &Term| match term {
        Term::Iri(iri) => match iri.strip_prefix(SKOLEM_PREFIX) {
            Some(label) => Term::Blank(label.to_string()),
            None => term.clone(),
        },
        other => other.clone(),
    };
    Statement {
        subject: map(&statement.subject),
        predicate: map(&statement.predicate),
        object: map(&statement.object),
        graph: statement.graph.as_ref().map(&map),
    }
}
