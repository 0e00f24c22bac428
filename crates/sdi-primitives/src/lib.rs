//! # sdi-primitives — Selective-Disclosure Pipeline Primitives
//!
//! The document-to-statement machinery underneath the ECDSA-SD
//! cryptosuite:
//!
//! - **Canonicalization** ([`Canonicalizer`], [`canonicalize_with`]) —
//!   deterministic, sorted statement sequences with blank-node labels
//!   optionally substituted through an HMAC or a supplied label map.
//! - **Selection** ([`compile_pointers`], [`project`]) — RFC 6901
//!   pointers compiled into structural filters and applied to documents.
//! - **Grouping** ([`group`], [`canonicalize_and_group`],
//!   [`filter_and_group`]) — partitioning statement sequences into
//!   matching/non-matching groups while preserving canonical order.
//! - **Hashing** ([`hash_mandatory`], [`hash_canonized_proof`]) — the
//!   fixed-size digests bound into the signed commitment.
//!
//! The built-in [`TreeCanonicalizer`] handles tree-shaped JSON documents;
//! a full RDF dataset canonicalizer can be substituted through the
//! [`Canonicalizer`] trait without touching the rest of the pipeline.

pub mod canonicalize;
pub mod error;
pub mod group;
pub mod hashing;
pub mod select;
pub mod skolem;
pub mod tree;

// Re-export primary types.
pub use canonicalize::{
    canonicalize_with, hmac_label, CanonicalDocument, Canonicalizer, LabelingStrategy,
    RelabeledDocument,
};
pub use error::PrimitiveError;
pub use group::{
    canonicalize_and_group, filter_and_group, group, project_statements, DisclosureGroups,
    GroupOutput, StatementGroup,
};
pub use hashing::{hash_canonized_proof, hash_mandatory};
pub use select::{compile_pointers, project, Filter};
pub use skolem::{deskolemize_statements, skolemize_statements, SKOLEM_PREFIX};
pub use tree::TreeCanonicalizer;
