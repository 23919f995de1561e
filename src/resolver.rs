//! Single-pass manuscript resolution.
//!
//! A [`Session`] owns the three label assigners of one compile. It walks the
//! manuscript once, replacing reference tokens as it meets them and leaving
//! a [`Segment::Listing`] hole for each listing token. Holes are filled once
//! the pass is over, when every index is final.

use std::collections::HashMap;

use serde::Serialize;

use crate::entries::{Entries, Figure, Table};
use crate::error::{CompileError, Warning};
use crate::labels::{Kind, LabelAssigner};
use crate::listing::{render_figures, render_references, render_tables};
use crate::markdown::{tokens, TokenKind};
use crate::range::format_index_range;
use crate::refs::{Reference, ReferenceStore};
use crate::style::Style;

/// The entry sets a manuscript may reference.
#[derive(Debug, Clone, Copy)]
pub struct Library<'a> {
    pub references: &'a ReferenceStore,
    pub figures: &'a Entries<Figure>,
    pub tables: &'a Entries<Table>,
}

/// Output of a successful compile pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// Manuscript with every token substituted.
    pub text: String,
    pub warnings: Vec<Warning>,
    pub assignments: Assignments,
}

/// Final tag → index assignments of one pass, ascending by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assignments {
    pub citations: Vec<Assignment>,
    pub figures: Vec<Assignment>,
    pub tables: Vec<Assignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub index: u32,
    pub tag: String,
}

/// Piece of output assembled during the pass.
#[derive(Debug)]
enum Segment<'t> {
    Text(&'t str),
    Resolved(String),
    Listing(Kind),
}

/// State of one compile pass. Consumed by [`Session::resolve`], so counters
/// can never leak into a later compile.
#[derive(Debug)]
pub struct Session<'a> {
    style: &'a Style,
    citations: LabelAssigner<'a, Reference>,
    figures: LabelAssigner<'a, Figure>,
    tables: LabelAssigner<'a, Table>,
}

impl<'a> Session<'a> {
    pub fn new(library: Library<'a>, style: &'a Style) -> Self {
        Self {
            style,
            citations: LabelAssigner::new(library.references),
            figures: LabelAssigner::new(library.figures),
            tables: LabelAssigner::new(library.tables),
        }
    }

    /// Resolves `text` in one forward pass.
    ///
    /// # Errors
    ///
    /// Stops at the first unknown tag or malformed token; no partial text is
    /// returned.
    pub fn resolve(mut self, text: &str) -> Result<Resolved, CompileError> {
        let mut segments: Vec<Segment<'_>> = Vec::new();
        let mut last = 0;

        for token in tokens(text) {
            let token = token?;
            let (start, end) = token.span;
            if start > last {
                segments.push(Segment::Text(&text[last..start]));
            }
            match token.kind {
                TokenKind::Reference { kind, tags } => {
                    segments.push(Segment::Resolved(self.resolve_reference(kind, &tags)?));
                }
                TokenKind::Listing(kind) => segments.push(Segment::Listing(kind)),
            }
            last = end;
        }
        if last < text.len() {
            segments.push(Segment::Text(&text[last..]));
        }

        let mut listings: HashMap<Kind, String> = HashMap::new();
        let mut out = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Text(s) => out.push_str(s),
                Segment::Resolved(s) => out.push_str(s),
                Segment::Listing(kind) => {
                    let listing = listings
                        .entry(*kind)
                        .or_insert_with(|| self.render_listing(*kind));
                    out.push_str(listing);
                }
            }
        }

        let warnings = self.warnings(|kind| listings.contains_key(&kind));
        Ok(Resolved {
            text: out,
            warnings,
            assignments: self.assignments(),
        })
    }

    /// Resolves every tag of one reference token and renders its markup.
    fn resolve_reference(&mut self, kind: Kind, tags: &[String]) -> Result<String, CompileError> {
        let mut indices: Vec<u32> = Vec::with_capacity(tags.len());
        for tag in tags {
            let index = self.assign(kind, tag)?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        Ok(self.style.format_inline(kind, &format_index_range(&indices)))
    }

    fn assign(&mut self, kind: Kind, tag: &str) -> Result<u32, CompileError> {
        match kind {
            Kind::Citation => self.citations.resolve(tag),
            Kind::Figure => self.figures.resolve(tag),
            Kind::Table => self.tables.resolve(tag),
        }
    }

    /// Listing markup for `kind` from the current assignments.
    pub fn render_listing(&self, kind: Kind) -> String {
        match kind {
            Kind::Citation => render_references(&self.citations, self.style),
            Kind::Figure => render_figures(&self.figures),
            Kind::Table => render_tables(&self.tables),
        }
    }

    fn warnings(&self, has_listing: impl Fn(Kind) -> bool) -> Vec<Warning> {
        let mut warnings = Vec::new();
        for kind in Kind::ALL {
            let (used, unused): (usize, Vec<&str>) = match kind {
                Kind::Citation => (self.citations.len(), self.citations.unused().collect()),
                Kind::Figure => (self.figures.len(), self.figures.unused().collect()),
                Kind::Table => (self.tables.len(), self.tables.unused().collect()),
            };
            if used > 0 && !has_listing(kind) {
                warnings.push(Warning::MissingListing { kind });
            }
            warnings.extend(unused.into_iter().map(|tag| Warning::UnusedEntry {
                kind,
                tag: tag.to_string(),
            }));
        }
        warnings
    }

    fn assignments(&self) -> Assignments {
        fn collect<T: crate::entries::EntryKind>(labels: &LabelAssigner<'_, T>) -> Vec<Assignment> {
            labels
                .used()
                .map(|(index, tag, _)| Assignment {
                    index,
                    tag: tag.to_string(),
                })
                .collect()
        }
        Assignments {
            citations: collect(&self.citations),
            figures: collect(&self.figures),
            tables: collect(&self.tables),
        }
    }
}

/// Resolves a manuscript that only cites references, with the plain style.
///
/// # Examples
///
/// ```
/// use refmark::{build_reference_store, resolve_document};
///
/// let (store, _) = build_reference_store("1. `tag:a` Alpha.\n2. `tag:b` Beta.\n");
/// let resolved = resolve_document("See `ref:b,a`.", &store).unwrap();
/// assert_eq!(resolved.text, "See [1,2].");
/// ```
pub fn resolve_document(text: &str, store: &ReferenceStore) -> Result<Resolved, CompileError> {
    let figures = Entries::new();
    let tables = Entries::new();
    let style = Style::default();
    let library = Library {
        references: store,
        figures: &figures,
        tables: &tables,
    };
    Session::new(library, &style).resolve(text)
}
