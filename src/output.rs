//! Output generation.
//!
//! Renders resolved markdown to HTML and writes the build artifacts. Every
//! file is written to a temporary sibling first and renamed into place, so
//! a failed build leaves the previous output untouched.

use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{html, Options, Parser};
use thiserror::Error;
use tracing::info;

use crate::error::Warning;
use crate::markdown::parser_options;
use crate::resolver::Assignments;

/// Stylesheet written next to `index.html` when none is configured.
pub const DEFAULT_STYLESHEET: &str = include_str!("../assets/style.css");

pub const MARKDOWN_FILE: &str = "index.md";
pub const HTML_FILE: &str = "index.html";
pub const STYLESHEET_FILE: &str = "style.css";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Turns resolved markdown into an HTML fragment.
pub trait Renderer {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer with raw HTML passthrough.
#[derive(Debug, Clone, Copy)]
pub struct CommonMark {
    options: Options,
}

impl Default for CommonMark {
    fn default() -> Self {
        Self {
            options: parser_options(),
        }
    }
}

impl Renderer for CommonMark {
    fn render(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(markdown, self.options));
        out
    }
}

/// Wraps an HTML fragment into a standalone document.
pub fn wrap_document(body: &str, stylesheet_href: &str) -> String {
    format!(
        "<!doctype html><html><link rel='stylesheet' href='{}'>\n{}</html>",
        stylesheet_href, body
    )
}

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    pub markdown: PathBuf,
    pub html: PathBuf,
    pub stylesheet: PathBuf,
}

/// Writes `index.md`, `index.html` and `style.css` into `out_dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// written.
pub fn write_outputs(
    out_dir: &Path,
    markdown: &str,
    html: &str,
    stylesheet: &str,
) -> Result<Outputs, OutputError> {
    fs::create_dir_all(out_dir).map_err(|source| OutputError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let outputs = Outputs {
        markdown: out_dir.join(MARKDOWN_FILE),
        html: out_dir.join(HTML_FILE),
        stylesheet: out_dir.join(STYLESHEET_FILE),
    };
    write_atomic(&outputs.markdown, markdown)?;
    info!("Wrote: {}", outputs.markdown.display());
    write_atomic(&outputs.html, html)?;
    info!("Wrote: {}", outputs.html.display());
    write_atomic(&outputs.stylesheet, stylesheet)?;

    Ok(outputs)
}

/// JSON report of assignments and warnings for tooling.
///
/// `warnings` is the full list of a build, bibliography warnings included.
pub fn report_json(assignments: &Assignments, warnings: &[Warning]) -> Result<String, OutputError> {
    let report = serde_json::json!({
        "assignments": assignments,
        "warnings": warnings,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Writes `contents` to `path` via a temporary sibling and a rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), OutputError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, contents).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        io_err(source)
    })
}
