//! # Statement grouping
//!
//! Partitions a canonical statement sequence into the subset implied by a
//! selection filter and the remainder, preserving original order in both
//! groups. Matching is positional: the projected subset is consumed with
//! a monotonically-advancing cursor, so duplicate statement text (for
//! example, repeated literal values) matches by position rather than by
//! set membership.
//!
//! [`filter_and_group`] is the disclosure-side entry point: it also
//! computes the relative positions of mandatory statements within the
//! revealed sequence and the fresh-canonical→current label map a derived
//! proof must carry.

use std::collections::BTreeMap;

use sdi_core::{LabelMap, Statement};
use serde_json::Value;

use crate::canonicalize::{canonicalize_with, Canonicalizer, LabelingStrategy};
use crate::error::PrimitiveError;
use crate::select::{project, Filter};
use crate::skolem::deskolemize_statements;

/// A partition of a statement sequence by a filter.
///
/// Every original index appears in exactly one of the two maps, and both
/// maps iterate in ascending original-index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementGroup {
    pub matching: BTreeMap<usize, Statement>,
    pub non_matching: BTreeMap<usize, Statement>,
}

/// Partition `statements` against the projected subset.
///
/// `projected` must be sorted in the same textual space as `statements`;
/// common elements then appear in the same relative order, which the
/// advancing cursor exploits.
pub fn group(statements: &[Statement], projected: &[Statement]) -> StatementGroup {
    let mut result = StatementGroup::default();
    let mut cursor = 0usize;
    for (index, statement) in statements.iter().enumerate() {
        if cursor < projected.len() && projected[cursor] == *statement {
            result.matching.insert(index, statement.clone());
            cursor += 1;
        } else {
            result.non_matching.insert(index, statement.clone());
        }
    }
    result
}

/// Project the skolemized document through `filter` and return the
/// selected statements, deskolemized and re-sorted into the textual
/// space of the full sequence.
pub fn project_statements<C: Canonicalizer>(
    canonicalizer: &C,
    skolemized: &Value,
    filter: &Filter,
) -> Result<Vec<Statement>, PrimitiveError> {
    let selected = project(skolemized, filter)?;
    let canonical = canonicalizer.canonicalize(&selected)?;
    let mut statements = deskolemize_statements(&canonical.statements);
    statements.sort();
    Ok(statements)
}

/// Output of [`canonicalize_and_group`].
#[derive(Debug, Clone)]
pub struct GroupOutput {
    /// The full canonical sequence with substituted labels.
    pub statements: Vec<Statement>,
    /// Document-internal label → substituted label.
    pub issued: LabelMap,
    /// Canonical (`c14nN`) label → substituted label.
    pub substitution: LabelMap,
    /// The skolemized document, when any filter required projection.
    pub skolemized: Option<Value>,
    /// One partition per named filter.
    pub groups: BTreeMap<String, StatementGroup>,
}

/// Canonicalize `document` under `strategy` and partition the resulting
/// sequence against each named filter.
///
/// A `None` filter means an empty selection: every statement lands in
/// `non_matching`.
pub fn canonicalize_and_group<C: Canonicalizer>(
    canonicalizer: &C,
    document: &Value,
    strategy: LabelingStrategy<'_>,
    filters: &BTreeMap<String, Option<&Filter>>,
) -> Result<GroupOutput, PrimitiveError> {
    let relabeled = canonicalize_with(canonicalizer, document, strategy)?;

    let skolemized = if filters.values().any(Option::is_some) {
        Some(canonicalizer.skolemize_document(document, &relabeled.issued)?)
    } else {
        None
    };

    let mut groups = BTreeMap::new();
    for (name, filter) in filters {
        let partition = match (filter, &skolemized) {
            (Some(filter), Some(skolemized)) => {
                let projected = project_statements(canonicalizer, skolemized, *filter)?;
                group(&relabeled.statements, &projected)
            }
            _ => StatementGroup {
                matching: BTreeMap::new(),
                non_matching: relabeled
                    .statements
                    .iter()
                    .cloned()
                    .enumerate()
                    .collect(),
            },
        };
        groups.insert(name.clone(), partition);
    }

    Ok(GroupOutput {
        statements: relabeled.statements,
        issued: relabeled.issued,
        substitution: relabeled.substitution,
        skolemized,
        groups,
    })
}

/// Output of [`filter_and_group`].
#[derive(Debug, Clone)]
pub struct DisclosureGroups {
    /// The revealed statements (combined selection) in canonical order,
    /// carrying the current (substituted) labels.
    pub reveal_statements: Vec<Statement>,
    /// Combined-selection partition with absolute indexes over the full
    /// sequence.
    pub combined: StatementGroup,
    /// Absolute indexes of mandatory statements in the full sequence.
    pub mandatory_absolute: BTreeMap<usize, Statement>,
    /// Positions of mandatory statements within `reveal_statements`.
    pub mandatory_relative: Vec<usize>,
    /// Fresh canonical label → current label, covering exactly the labels
    /// surviving into the revealed statements.
    pub label_map: LabelMap,
}

/// Group a statement sequence for disclosure: partition by the combined
/// filter (absolute indexes), locate mandatory statements both absolutely
/// and relative to the revealed sequence, and derive the label map a
/// verifier needs to reproduce the current labels from the revealed
/// document alone.
pub fn filter_and_group<C: Canonicalizer>(
    canonicalizer: &C,
    statements: &[Statement],
    skolemized: &Value,
    combined: &Filter,
    mandatory: Option<&Filter>,
) -> Result<DisclosureGroups, PrimitiveError> {
    let projected_combined = project_statements(canonicalizer, skolemized, combined)?;
    let combined_group = group(statements, &projected_combined);
    let reveal_statements: Vec<Statement> = combined_group.matching.values().cloned().collect();

    let (mandatory_absolute, mandatory_relative) = match mandatory {
        None => (BTreeMap::new(), Vec::new()),
        Some(filter) => {
            let projected_mandatory = project_statements(canonicalizer, skolemized, filter)?;
            let absolute = group(statements, &projected_mandatory).matching;
            let relative = group(&reveal_statements, &projected_mandatory)
                .matching
                .keys()
                .copied()
                .collect();
            (absolute, relative)
        }
    };

    // Canonicalize the revealed subset on its own to learn the labels a
    // verifier will derive from the revealed document, then invert into
    // fresh-canonical → current.
    let fresh = canonicalizer.canonicalize_statements(&reveal_statements)?;
    let label_map = fresh.issued.invert();

    Ok(DisclosureGroups {
        reveal_statements,
        combined: combined_group,
        mandatory_absolute,
        mandatory_relative,
        label_map,
    })
}
