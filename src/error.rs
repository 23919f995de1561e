//! Compile errors and non-fatal warnings.
//!
//! Errors abort the whole compile pass; warnings are collected and handed
//! back to the caller next to the resolved text.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::labels::Kind;

/// Fatal errors raised while resolving a manuscript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unknown {kind} tag: {tag}")]
    UnknownTag { kind: Kind, tag: String },

    #[error("Malformed token {token}: {reason}")]
    MalformedToken { token: String, reason: String },
}

/// Conditions worth reporting that do not stop output generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// An entry was declared but never referenced.
    UnusedEntry { kind: Kind, tag: String },
    /// A bibliography tag was declared more than once; the later line won.
    DuplicateEntry { kind: Kind, tag: String, line: usize },
    /// Entries of this kind were referenced but no listing token emits them.
    MissingListing { kind: Kind },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnusedEntry { kind, tag } => write!(f, "unused {} entry: {}", kind, tag),
            Warning::DuplicateEntry { kind, tag, line } => write!(
                f,
                "duplicate {} tag '{}' on line {} overrides the earlier entry",
                kind, tag, line
            ),
            Warning::MissingListing { kind } => write!(
                f,
                "{} are referenced but the manuscript has no `{}` listing",
                kind.plural(),
                kind.listing_keyword()
            ),
        }
    }
}
