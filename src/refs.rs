//! Bibliography loading.
//!
//! A bibliography is a plain markdown numbered list where each item starts
//! with a backtick-quoted tag:
//!
//! ```text
//! 1. `tag:smith2020` Smith J. A study of things. J Things. 2020. doi:10.1000/xyz
//! ```
//!
//! Lines that do not match this shape are ignored.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::entries::{Entries, EntryKind};
use crate::error::Warning;
use crate::labels::Kind;

static ENTRY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+`tag:([^`]+)`\s+(.+)$").unwrap());

static DOI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bdoi:\s*(\S+)").unwrap());

/// Errors that can occur when loading a bibliography.
#[derive(Error, Debug)]
pub enum RefsError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
}

/// One bibliography item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Free-form source text, kept verbatim.
    pub source: String,
    /// DOI found in the source text, if any.
    pub doi: Option<String>,
}

impl EntryKind for Reference {
    const KIND: Kind = Kind::Citation;
}

/// All tagged references of one bibliography snapshot.
pub type ReferenceStore = Entries<Reference>;

/// Parses bibliography text into a reference store.
///
/// Duplicate tags keep the last declaration and produce a
/// [`Warning::DuplicateEntry`].
///
/// # Examples
///
/// ```
/// use refmark::build_reference_store;
///
/// let (store, warnings) = build_reference_store("1. `tag:a` Alpha.\nnot an entry\n");
/// assert_eq!(store.len(), 1);
/// assert!(warnings.is_empty());
/// ```
pub fn build_reference_store(text: &str) -> (ReferenceStore, Vec<Warning>) {
    let mut store = ReferenceStore::new();
    let mut warnings = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let Some(cap) = ENTRY_LINE.captures(line.trim_end()) else {
            continue;
        };
        let tag = &cap[1];
        let source = cap[2].trim().to_string();
        let doi = extract_doi(&source);

        if store.insert(tag, Reference { source, doi }).is_some() {
            warnings.push(Warning::DuplicateEntry {
                kind: Kind::Citation,
                tag: tag.to_string(),
                line: line_num + 1,
            });
        }
    }

    (store, warnings)
}

/// Reads and parses a bibliography file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_reference_store(path: &Path) -> Result<(ReferenceStore, Vec<Warning>), RefsError> {
    let content = fs::read_to_string(path)?;
    Ok(build_reference_store(&content))
}

fn extract_doi(source: &str) -> Option<String> {
    DOI.captures(source)
        .map(|cap| cap[1].trim_end_matches(['.', ',', ';']).to_string())
        .filter(|doi| !doi.is_empty())
}
