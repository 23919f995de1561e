//! refmark: compile a markdown manuscript with first-use numbered citations,
//! figures and tables.
//!
//! Authors write stable tags (`` `ref:smith2020` ``, `` `fig:overview` ``)
//! and listing markers (`` `references` ``). This library:
//! - Parses a numbered-list bibliography into tagged references
//! - Numbers citations, figures and tables in order of first use
//! - Renders compact ranges such as `1,3,4,6-8`
//! - Emits the reference, figure and table listings where they are marked
//! - Renders the result to HTML and writes the output directory

pub mod build;
pub mod config;
pub mod entries;
pub mod error;
pub mod labels;
pub mod listing;
pub mod markdown;
pub mod output;
pub mod range;
pub mod refs;
pub mod resolver;
pub mod style;
pub mod watch;

pub use build::{build, compile_source, resolve_style, BuildError, BuildOptions, BuildReport};
pub use config::{discover_config, load_config, ProjectConfig};
pub use entries::{Entries, EntryKind, Figure, Table};
pub use error::{CompileError, Warning};
pub use labels::{Kind, LabelAssigner};
pub use markdown::{extract_tokens, Token, TokenKind};
pub use output::{report_json, wrap_document, CommonMark, Renderer};
pub use range::format_index_range;
pub use refs::{build_reference_store, load_reference_store, Reference, ReferenceStore};
pub use resolver::{resolve_document, Assignment, Assignments, Library, Resolved, Session};
pub use style::{builtin_style, builtin_style_names, load_style, Style};
