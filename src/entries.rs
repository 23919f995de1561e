//! Tagged entry sets backing the three label kinds.
//!
//! References come from the bibliography file; figures and tables are
//! declared in the project file keyed by tag. All three end up in an
//! [`Entries`] so the label assigner can treat them alike.

use std::collections::HashMap;

use serde::Deserialize;

use crate::labels::Kind;

/// Ties an entry type to the label kind that numbers it.
pub trait EntryKind {
    const KIND: Kind;
}

/// A figure declared in the project file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Figure {
    /// Caption text, rendered after `Figure N`.
    pub caption: String,
    /// Image source; defaults to `fig-<index>.png` when absent.
    #[serde(default)]
    pub src: Option<String>,
}

impl EntryKind for Figure {
    const KIND: Kind = Kind::Figure;
}

/// A table declared in the project file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Table {
    pub caption: String,
    /// Raw markup placed inside the table's `<figure>` block.
    #[serde(default)]
    pub content: String,
}

impl EntryKind for Table {
    const KIND: Kind = Kind::Table;
}

/// Tag-keyed entries kept in declaration order.
///
/// Re-inserting a tag replaces its value but keeps the position of the
/// first declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<T> {
    items: Vec<(String, T)>,
    positions: HashMap<String, usize>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T> Entries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the value it replaced if the tag existed.
    pub fn insert(&mut self, tag: impl Into<String>, item: T) -> Option<T> {
        let tag = tag.into();
        match self.positions.get(&tag) {
            Some(&pos) => Some(std::mem::replace(&mut self.items[pos].1, item)),
            None => {
                self.positions.insert(tag.clone(), self.items.len());
                self.items.push((tag, item));
                None
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&T> {
        self.positions.get(tag).map(|&pos| &self.items[pos].1)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.positions.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(tag, item)| (tag.as_str(), item))
    }
}

impl<T> FromIterator<(String, T)> for Entries<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (tag, item) in iter {
            entries.insert(tag, item);
        }
        entries
    }
}
