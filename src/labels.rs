//! First-use numbering of tags.
//!
//! One [`LabelAssigner`] exists per [`Kind`] and compile pass. The first
//! time a tag is resolved it receives the next free index (starting at 1);
//! later lookups return the same index without advancing the counter.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::entries::{Entries, EntryKind};
use crate::error::CompileError;

/// The three independently numbered label kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Citation,
    Figure,
    Table,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Citation, Kind::Figure, Kind::Table];

    /// Prefix used by reference tokens, e.g. `ref` in `` `ref:a,b` ``.
    pub fn token_prefix(self) -> &'static str {
        match self {
            Kind::Citation => "ref",
            Kind::Figure => "fig",
            Kind::Table => "tab",
        }
    }

    /// Keyword of the listing token for this kind.
    pub fn listing_keyword(self) -> &'static str {
        match self {
            Kind::Citation => "references",
            Kind::Figure => "figures",
            Kind::Table => "tables",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Kind::Citation => "citations",
            Kind::Figure => "figures",
            Kind::Table => "tables",
        }
    }

    pub fn from_token_prefix(prefix: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.token_prefix() == prefix)
    }

    pub fn from_listing_keyword(keyword: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.listing_keyword() == keyword)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Citation => "citation",
            Kind::Figure => "figure",
            Kind::Table => "table",
        };
        f.write_str(name)
    }
}

/// Assigns display indices to tags of one kind in order of first use.
#[derive(Debug)]
pub struct LabelAssigner<'a, T> {
    entries: &'a Entries<T>,
    next: u32,
    indices: HashMap<String, u32>,
    order: Vec<String>,
}

impl<'a, T: EntryKind> LabelAssigner<'a, T> {
    pub fn new(entries: &'a Entries<T>) -> Self {
        Self {
            entries,
            next: 1,
            indices: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        T::KIND
    }

    /// Returns the display index for `tag`, assigning one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownTag`] if the backing entry set has no
    /// such tag. No index is consumed in that case.
    pub fn resolve(&mut self, tag: &str) -> Result<u32, CompileError> {
        if let Some(&index) = self.indices.get(tag) {
            return Ok(index);
        }
        if !self.entries.contains(tag) {
            return Err(CompileError::UnknownTag {
                kind: T::KIND,
                tag: tag.to_string(),
            });
        }

        let index = self.next;
        self.next += 1;
        self.indices.insert(tag.to_string(), index);
        self.order.push(tag.to_string());
        debug!("{} #{} = {}", T::KIND, index, tag);
        Ok(index)
    }

    /// Index previously assigned to `tag`, if any.
    pub fn index_of(&self, tag: &str) -> Option<u32> {
        self.indices.get(tag).copied()
    }

    /// Tags resolved so far, in assignment order.
    pub fn used_tags(&self) -> &[String] {
        &self.order
    }

    /// Used entries with their index, ascending by index.
    pub fn used(&self) -> impl Iterator<Item = (u32, &str, &'a T)> + '_ {
        let entries = self.entries;
        self.order.iter().filter_map(move |tag| {
            let index = *self.indices.get(tag)?;
            let entry = entries.get(tag)?;
            Some((index, tag.as_str(), entry))
        })
    }

    /// Tags of the backing set that were never resolved, in declaration order.
    pub fn unused(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries
            .iter()
            .filter(move |(tag, _)| !self.indices.contains_key(*tag))
            .map(|(tag, _)| tag)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
