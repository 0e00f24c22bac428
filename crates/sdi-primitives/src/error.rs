//! # Pipeline error types

use sdi_core::{LabelMapError, PointerError};
use thiserror::Error;

/// Errors from the selective-disclosure pipeline primitives.
#[derive(Error, Debug)]
pub enum PrimitiveError {
    /// The document cannot be converted into statements.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Arrays of arrays cannot be expressed as statements or filters.
    #[error("arrays of arrays are not supported")]
    NestedArrays,

    /// A selection pointer does not resolve against the document.
    #[error("JSON pointer {pointer:?} does not match document")]
    UnresolvedPointer { pointer: String },

    /// Pointer syntax error.
    #[error(transparent)]
    Pointer(#[from] PointerError),

    /// A label required for substitution has no mapping.
    #[error("no label mapping for blank node {0:?}")]
    MissingLabel(String),

    /// Label bookkeeping produced a non-bijective map.
    #[error(transparent)]
    LabelMap(#[from] LabelMapError),
}
