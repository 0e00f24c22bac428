//! # Blank-node label maps
//!
//! A [`LabelMap`] records how blank-node labels from one canonicalization
//! run correspond to labels from another — canonical labels to
//! signer-assigned stable labels, or back. Derived proofs carry a
//! compressed form of this map so a verifier can reproduce the signer's
//! statement ordering without learning the signer's label-derivation key.
//!
//! The map is bijective by construction: both the source and the target
//! side reject duplicates.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Errors from building a [`LabelMap`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LabelMapError {
    /// The source label was already mapped.
    #[error("duplicate source label: {0}")]
    DuplicateSource(String),

    /// The target label is already the image of another source label.
    #[error("duplicate target label: {0}")]
    DuplicateTarget(String),
}

/// An ordered, bijective mapping between blank-node labels.
///
/// Iteration order is lexicographic over source labels, which keeps every
/// serialized form of the map deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: BTreeMap<String, String>,
    targets: BTreeSet<String>,
}

impl LabelMap {
    /// Create an empty label map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a `from -> to` mapping.
    pub fn insert(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<(), LabelMapError> {
        let from = from.into();
        let to = to.into();
        if self.entries.contains_key(&from) {
            return Err(LabelMapError::DuplicateSource(from));
        }
        if !self.targets.insert(to.clone()) {
            return Err(LabelMapError::DuplicateTarget(to));
        }
        self.entries.insert(from, to);
        Ok(())
    }

    /// Look up the target label for a source label.
    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries.get(from).map(String::as_str)
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(source, target)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Swap sources and targets. Bijectivity makes this total.
    pub fn invert(&self) -> LabelMap {
        let mut inverted = LabelMap::new();
        for (from, to) in self.iter() {
            // cannot collide: targets were unique
            let _ = inverted.insert(to, from);
        }
        inverted
    }

    /// Compose with another map: `self: a -> b`, `other: b -> c` yields
    /// `a -> c`. Sources whose target has no entry in `other` are dropped.
    pub fn compose(&self, other: &LabelMap) -> LabelMap {
        let mut composed = LabelMap::new();
        for (from, mid) in self.iter() {
            if let Some(to) = other.get(mid) {
                let _ = composed.insert(from, to);
            }
        }
        composed
    }
}

impl<'a> IntoIterator for &'a LabelMap {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
