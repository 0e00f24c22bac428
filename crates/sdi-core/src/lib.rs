//! # sdi-core — Domain Primitives for the SDI Stack
//!
//! Shared building blocks for the selective-disclosure pipeline:
//!
//! - **Statement model** ([`Statement`], [`Term`]) — ordered quads in
//!   canonical textual form, the unit every pipeline stage operates on.
//! - **Label maps** ([`LabelMap`]) — bijective blank-node label mappings
//!   carried between signer, holder, and verifier.
//! - **JSON pointers** ([`JsonPointer`]) — RFC 6901 paths naming the
//!   document subtrees a selection reveals.
//!
//! ## Invariants
//!
//! - Statement sequences are order-significant; canonical order is plain
//!   byte order of the serialized statement text.
//! - A [`LabelMap`] is bijective by construction — inserting a duplicate
//!   source or target label is rejected, never silently overwritten.

pub mod label;
pub mod pointer;
pub mod statement;

// Re-export primary types.
pub use label::{LabelMap, LabelMapError};
pub use pointer::{JsonPointer, PathSegment, PointerError};
pub use statement::{sort_statements, Statement, Term};
