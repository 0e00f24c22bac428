//! # JSON pointers
//!
//! RFC 6901 pointer parsing for selection paths. A pointer names a subtree
//! or a single array element of the document being disclosed; the filter
//! compiler walks the parsed segments against the concrete document.
//!
//! Escape handling follows RFC 6901: `~0` unescapes to `~` and `~1` to
//! `/`. Any other `~` sequence is a fatal parse error.

use std::fmt;

use thiserror::Error;

/// Errors from pointer parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PointerError {
    /// A non-empty pointer must begin with `/`.
    #[error("JSON pointer must be empty or start with '/': {0:?}")]
    MissingLeadingSlash(String),

    /// A `~` was followed by something other than `0` or `1`.
    #[error("invalid JSON pointer escape sequence in {0:?}")]
    InvalidEscape(String),
}

/// One step of a parsed pointer.
///
/// Digit-only segments parse as [`PathSegment::Index`]; the filter
/// compiler falls back to the key interpretation when the document node at
/// that step is an object rather than an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An object member name.
    Key(String),
    /// An array position.
    Index(usize),
}

impl PathSegment {
    /// The object-key reading of this segment.
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A parsed RFC 6901 JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    raw: String,
    segments: Vec<PathSegment>,
}

impl JsonPointer {
    /// Parse a pointer string.
    ///
    /// The empty pointer refers to the whole document.
    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        if pointer.is_empty() {
            return Ok(Self {
                raw: String::new(),
                segments: Vec::new(),
            });
        }
        if !pointer.starts_with('/') {
            return Err(PointerError::MissingLeadingSlash(pointer.to_string()));
        }
        let mut segments = Vec::new();
        for part in pointer.split('/').skip(1) {
            let unescaped = unescape(part, pointer)?;
            segments.push(classify(unescaped));
        }
        Ok(Self {
            raw: pointer.to_string(),
            segments,
        })
    }

    /// The original pointer text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed path segments, root first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns `true` if this pointer selects the whole document.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn classify(segment: String) -> PathSegment {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(index) = segment.parse::<usize>() {
            return PathSegment::Index(index);
        }
    }
    PathSegment::Key(segment)
}

fn unescape(part: &str, pointer: &str) -> Result<String, PointerError> {
    if !part.contains('~') {
        return Ok(part.to_string());
    }
    let mut out = String::with_capacity(part.len());
    let mut chars = part.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PointerError::InvalidEscape(pointer.to_string())),
        }
    }
    Ok(out)
}
