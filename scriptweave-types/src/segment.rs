//! Parsed script segments.

use crate::ResourceUrl;
use serde::{Deserialize, Serialize};

/// One piece of a parsed script, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    /// Code copied verbatim into the output.
    Literal(String),
    /// An import directive, already resolved to an absolute URL.
    ImportRef(ResourceUrl),
}

impl Segment {
    /// Returns the literal text, if this is a literal segment.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            Self::ImportRef(_) => None,
        }
    }

    /// Returns the imported URL, if this is an import reference.
    pub fn as_import(&self) -> Option<&ResourceUrl> {
        match self {
            Self::Literal(_) => None,
            Self::ImportRef(url) => Some(url),
        }
    }
}
