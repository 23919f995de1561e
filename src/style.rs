//! Citation markup styles.
//!
//! A style is a handful of `{placeholder}` templates controlling how
//! resolved tokens and reference list items are written. Styles are either
//! builtin (see [`builtin_style_names`]) or loaded from a TOML file.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::labels::Kind;

/// Errors that can occur when loading styles.
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid style: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Templates used when substituting tokens and rendering listings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    /// Inline replacement of `ref:` tokens; `{items}` is the compact range.
    pub citation: String,
    /// Inline replacement of `fig:` tokens.
    pub figure: String,
    /// Inline replacement of `tab:` tokens.
    pub table: String,
    /// Body of one reference list item: `{source}`, `{doi}`, `{index}`.
    pub reference: String,
    /// Wrap each number as `<span class="ref">N</span>` (or `fig`/`tab`).
    pub wrap_numbers: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            citation: "[{items}]".to_string(),
            figure: "{items}".to_string(),
            table: "{items}".to_string(),
            reference: "{source}".to_string(),
            wrap_numbers: false,
        }
    }
}

impl Style {
    /// The inline template for reference tokens of `kind`.
    pub fn inline_template(&self, kind: Kind) -> &str {
        match kind {
            Kind::Citation => &self.citation,
            Kind::Figure => &self.figure,
            Kind::Table => &self.table,
        }
    }

    /// Renders the inline replacement for a compact range of `kind`.
    pub fn format_inline(&self, kind: Kind, range: &str) -> String {
        let items = if self.wrap_numbers {
            wrap_numbers(range, css_class(kind))
        } else {
            range.to_string()
        };
        fill(self.inline_template(kind), &[("items", &items)])
    }
}

/// CSS class of the number spans and the anchor prefix of listing items.
pub fn css_class(kind: Kind) -> &'static str {
    kind.token_prefix()
}

/// Replaces each `{name}` in `template` with its value.
///
/// The template is scanned once; substituted values are copied as-is and
/// never scanned again. Unknown placeholders are left as written.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn wrap_numbers(range: &str, class: &str) -> String {
    let mut out = String::with_capacity(range.len() * 4);
    let mut number = String::new();
    for c in range.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        push_number(&mut out, &mut number, class);
        out.push(c);
    }
    push_number(&mut out, &mut number, class);
    out
}

fn push_number(out: &mut String, number: &mut String, class: &str) {
    if !number.is_empty() {
        out.push_str(&format!(r#"<span class="{}">{}</span>"#, class, number));
        number.clear();
    }
}

/// Loads a style from a TOML file. Missing fields take the `plain` values.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid style.
pub fn load_style(path: &Path) -> Result<Style, StyleError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Single source of truth for builtin styles.
const BUILTIN_STYLES: &[(&str, fn() -> Style)] = &[("plain", plain_style), ("html", html_style)];

fn plain_style() -> Style {
    Style::default()
}

fn html_style() -> Style {
    Style {
        wrap_numbers: true,
        ..Style::default()
    }
}

/// Returns a built-in style by name.
pub fn builtin_style(name: &str) -> Option<Style> {
    BUILTIN_STYLES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, build)| build())
}

/// Returns the list of available builtin style names.
pub fn builtin_style_names() -> Vec<&'static str> {
    BUILTIN_STYLES.iter().map(|(n, _)| *n).collect()
}
