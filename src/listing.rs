//! Deferred listing markup.
//!
//! Listings are rendered after the whole manuscript has been scanned, from
//! the final state of each label assigner. Only used entries appear, in
//! ascending index order, each anchored by its index (`ref-3`, `fig-1`).

use crate::entries::{Figure, Table};
use crate::labels::{Kind, LabelAssigner};
use crate::refs::Reference;
use crate::style::{css_class, fill, Style};

/// Renders the `<ol class="references">` block.
pub fn render_references(labels: &LabelAssigner<'_, Reference>, style: &Style) -> String {
    let prefix = css_class(Kind::Citation);
    let items: Vec<String> = labels
        .used()
        .map(|(index, _, reference)| {
            let index_str = index.to_string();
            let doi = reference.doi.as_deref().unwrap_or("");
            let formatted = fill(
                &style.reference,
                &[("source", &reference.source), ("doi", doi), ("index", &index_str)],
            );
            format!(
                r#"  <li id="{}-{}" data-doi="{}" value="{}">{}</li>"#,
                prefix,
                index,
                escape_attr(doi),
                index,
                formatted.trim()
            )
        })
        .collect();

    if items.is_empty() {
        "<ol class=\"references\">\n</ol>".to_string()
    } else {
        format!("<ol class=\"references\">\n{}\n</ol>", items.join("\n"))
    }
}

/// Renders one `<figure>` block per used figure.
pub fn render_figures(labels: &LabelAssigner<'_, Figure>) -> String {
    let prefix = css_class(Kind::Figure);
    labels
        .used()
        .map(|(index, _, figure)| {
            let src = figure
                .src
                .clone()
                .unwrap_or_else(|| format!("{}-{}.png", prefix, index));
            format!(
                "<figure id=\"{p}-{i}\">\n  <img src=\"{src}\" />\n  <figcaption><b>Figure {i}</b> {caption}</figcaption>\n</figure>",
                p = prefix,
                i = index,
                src = escape_attr(&src),
                caption = figure.caption.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one `<figure>` block per used table.
pub fn render_tables(labels: &LabelAssigner<'_, Table>) -> String {
    let prefix = css_class(Kind::Table);
    labels
        .used()
        .map(|(index, _, table)| {
            format!(
                "<figure id=\"{p}-{i}\">\n  {content}\n  <figcaption><b>Table {i}</b> {caption}</figcaption>\n</figure>",
                p = prefix,
                i = index,
                content = table.content.trim(),
                caption = table.caption.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escapes a value for use inside a double-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
