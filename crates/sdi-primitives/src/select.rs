//! # Pointer-to-filter compilation and projection
//!
//! A selection arrives as RFC 6901 pointers naming subtrees or single
//! array elements. [`compile_pointers`] walks each pointer against the
//! concrete document to discover the shape at every step and merges the
//! paths into one structural [`Filter`]; [`project`] applies a filter to
//! a document, producing the selected sub-document.
//!
//! Filters are explicit: a field not named by a pointer is excluded,
//! except for each visited object's minimal identity — its `id` (when
//! present and not a blank node) and, when enabled, its `type`. Arrays
//! project per-index into a compacted array in ascending index order,
//! never a sparse one.

use std::collections::BTreeMap;

use sdi_core::{JsonPointer, PathSegment};
use serde_json::{Map, Value};

use crate::error::PrimitiveError;

/// A compiled structural filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    root: FilterNode,
    include_types: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterNode {
    /// Include the entire subtree at this position.
    All,
    /// An object with selected members.
    Node(BTreeMap<String, FilterNode>),
    /// An array with selected positions.
    Array(BTreeMap<usize, FilterNode>),
}

/// Compile selection pointers against `document` into a filter.
///
/// Returns `None` for an empty pointer list (nothing selected). A
/// pointer that does not resolve against the document is fatal.
pub fn compile_pointers(
    document: &Value,
    pointers: &[String],
    include_types: bool,
) -> Result<Option<Filter>, PrimitiveError> {
    if pointers.is_empty() {
        return Ok(None);
    }
    if !document.is_object() {
        return Err(PrimitiveError::MalformedDocument(
            "selection target must be an object".into(),
        ));
    }
    let mut root = FilterNode::Node(BTreeMap::new());
    for pointer in pointers {
        let parsed = JsonPointer::parse(pointer)?;
        if parsed.is_root() {
            check_terminal_arrays(document)?;
            root = FilterNode::All;
            continue;
        }
        insert_path(&mut root, document, parsed.segments(), pointer)?;
    }
    Ok(Some(Filter {
        root,
        include_types,
    }))
}

/// Apply `filter` to `document`, producing the selected sub-document.
///
/// The document's `@context` (if any) is carried onto the projected root
/// so the projection canonicalizes under the same term resolution.
pub fn project(document: &Value, filter: &Filter) -> Result<Value, PrimitiveError> {
    let mut projected = project_node(document, &filter.root, filter.include_types)?;
    if let (Some(context), Value::Object(out)) = (document.get("@context"), &mut projected) {
        out.insert("@context".to_string(), context.clone());
    }
    Ok(projected)
}

fn insert_path(
    node: &mut FilterNode,
    value: &Value,
    segments: &[PathSegment],
    pointer: &str,
) -> Result<(), PrimitiveError> {
    if matches!(node, FilterNode::All) {
        // subtree already fully selected; the pointer must still resolve
        return validate_path(value, segments, pointer);
    }
    let segment = &segments[0];
    let child_value = resolve_segment(value, segment)
        .ok_or_else(|| PrimitiveError::UnresolvedPointer {
            pointer: pointer.to_string(),
        })?;

    let children = match (node, value) {
        (FilterNode::Node(children), Value::Object(_)) => {
            let key = segment.as_key();
            let slot = children.entry(key).or_insert_with(|| empty_for(child_value));
            return descend(slot, child_value, segments, pointer);
        }
        (FilterNode::Array(children), Value::Array(_)) => children,
        _ => {
            return Err(PrimitiveError::MalformedDocument(format!(
                "filter shape does not match document at {pointer:?}"
            )))
        }
    };
    let PathSegment::Index(index) = segment else {
        return Err(PrimitiveError::UnresolvedPointer {
            pointer: pointer.to_string(),
        });
    };
    let slot = children.entry(*index).or_insert_with(|| empty_for(child_value));
    descend(slot, child_value, segments, pointer)
}

fn descend(
    slot: &mut FilterNode,
    child_value: &Value,
    segments: &[PathSegment],
    pointer: &str,
) -> Result<(), PrimitiveError> {
    if segments.len() == 1 {
        check_terminal_arrays(child_value)?;
        *slot = FilterNode::All;
        Ok(())
    } else {
        insert_path(slot, child_value, &segments[1..], pointer)
    }
}

fn empty_for(value: &Value) -> FilterNode {
    match value {
        Value::Array(_) => FilterNode::Array(BTreeMap::new()),
        _ => FilterNode::Node(BTreeMap::new()),
    }
}

fn resolve_segment<'a>(value: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), segment) => map.get(&segment.as_key()),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn validate_path(value: &Value, segments: &[PathSegment], pointer: &str) -> Result<(), PrimitiveError> {
    let mut current = value;
    for segment in segments {
        current = resolve_segment(current, segment)
            .ok_or_else(|| PrimitiveError::UnresolvedPointer {
                pointer: pointer.to_string(),
            })?;
    }
    Ok(())
}

fn check_terminal_arrays(value: &Value) -> Result<(), PrimitiveError> {
    if let Value::Array(items) = value {
        if items.iter().any(Value::is_array) {
            return Err(PrimitiveError::NestedArrays);
        }
    }
    Ok(())
}

fn project_node(
    value: &Value,
    node: &FilterNode,
    include_types: bool,
) -> Result<Value, PrimitiveError> {
    match node {
        FilterNode::All => Ok(value.clone()),
        FilterNode::Node(children) => {
            let source = value.as_object().ok_or_else(|| {
                PrimitiveError::MalformedDocument("filter expects an object".into())
            })?;
            let mut out = Map::new();
            if let Some(Value::String(id)) = source.get("id") {
                if !id.starts_with("_:") {
                    out.insert("id".to_string(), Value::String(id.clone()));
                }
            }
            if include_types {
                if let Some(types) = source.get("type") {
                    out.insert("type".to_string(), types.clone());
                }
            }
            for (key, child) in children {
                let member = source.get(key).ok_or_else(|| {
                    PrimitiveError::MalformedDocument(format!(
                        "selection does not match document at member {key:?}"
                    ))
                })?;
                out.insert(key.clone(), project_node(member, child, include_types)?);
            }
            Ok(Value::Object(out))
        }
        FilterNode::Array(children) => {
            let source = value.as_array().ok_or_else(|| {
                PrimitiveError::MalformedDocument("filter expects an array".into())
            })?;
            // ascending index order, compacted — never sparse
            let mut out = Vec::with_capacity(children.len());
            for (index, child) in children {
                let element = source.get(*index).ok_or_else(|| {
                    PrimitiveError::MalformedDocument(format!(
                        "selection does not match document at index {index}"
                    ))
                })?;
                out.push(project_node(element, child, include_types)?);
            }
            Ok(Value::Array(out))
        }
    }
}
