//! Reference grammar parsing
//!
//! Document leaves point at other leaves with a bracketed reference string
//! such as `{tokens.size.md}` or `{brand.themes.light.palettes.core.interactive}`.
//! An older document generation wrote the same pointers without braces;
//! both forms parse. Anything that does not match the grammar is a
//! literal, never an error: documents are authored by tooling, and a
//! stray string should render as-is rather than abort a pass.

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Document collection a reference can point into.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Collection {
    Tokens,
    Brand,
}

impl Collection {
    /// Case-insensitive collection name lookup.
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("tokens") {
            Some(Self::Tokens)
        } else if name.eq_ignore_ascii_case("brand") {
            Some(Self::Brand)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Brand => "brand",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed pointer from one document leaf to another location.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Reference {
    pub collection: Collection,
    pub path: Vec<String>,
}

/// Why a string failed the strict reference grammar.
///
/// Only [`parse_reference_strict`] reports these; the rendering path uses
/// [`parse_reference`], which degrades every malformed string to a literal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceSyntaxError {
    #[error("unbalanced braces in `{0}`")]
    UnbalancedBraces(String),

    #[error("unknown collection `{0}` (expected `tokens` or `brand`)")]
    UnknownCollection(String),

    #[error("reference `{0}` has no path segments")]
    EmptyPath(String),

    #[error("reference `{0}` contains an invalid path segment")]
    InvalidSegment(String),
}

/// Parse a raw leaf string. `None` means the string is not a reference and
/// the caller should treat it as a literal.
pub fn parse_reference(raw: &str) -> Option<Reference> {
    parse_reference_strict(raw).ok()
}

/// Validating variant of [`parse_reference`] for tooling that wants to
/// know what the loose path would have silently rendered as a literal.
pub fn parse_reference_strict(raw: &str) -> Result<Reference, ReferenceSyntaxError> {
    let trimmed = raw.trim();
    let body = match (trimmed.strip_prefix('{'), trimmed.ends_with('}')) {
        (Some(inner), true) => &inner[..inner.len() - 1],
        (Some(_), false) | (None, true) => {
            return Err(ReferenceSyntaxError::UnbalancedBraces(raw.to_string()))
        }
        (None, false) => trimmed,
    };

    let mut segments = body.split('.');
    let head = segments.next().unwrap_or("").trim();
    let collection = Collection::parse(head)
        .ok_or_else(|| ReferenceSyntaxError::UnknownCollection(head.to_string()))?;

    let path: Vec<String> = segments.map(|s| s.trim().to_string()).collect();
    if path.is_empty() {
        return Err(ReferenceSyntaxError::EmptyPath(raw.to_string()));
    }
    if path.iter().any(|s| !is_valid_segment(s)) {
        return Err(ReferenceSyntaxError::InvalidSegment(raw.to_string()));
    }

    Ok(Reference { collection, path })
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
