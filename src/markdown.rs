//! Manuscript token scanner.
//!
//! Finds the backtick tokens that drive numbering:
//!
//! - reference tokens: `` `ref:a,b` ``, `` `fig:overview` ``, `` `tab:results` ``
//! - listing tokens: `` `references` ``, `` `figures` ``, `` `tables` ``
//!
//! A token is a single-backtick code span whose content matches one of
//! these forms. The manuscript is parsed with pulldown-cmark to find the
//! code spans, so text inside code blocks (fenced or indented) and inside
//! longer code spans is never a token.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser};
use regex::{Captures, Regex};

use crate::error::CompileError;
use crate::labels::Kind;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^`(?:(ref|fig|tab):([^`]*)|(references|figures|tables))`$").unwrap()
});

/// A recognised token and its byte span in the manuscript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Start and end byte positions in the original text
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Cites one or more tags of a kind, in the order written.
    Reference { kind: Kind, tags: Vec<String> },
    /// Marks where the listing of a kind goes.
    Listing(Kind),
}

/// Lazily scans `markdown` for tokens, left to right.
///
/// A malformed reference token yields an error in its position, so callers
/// that stop at the first error never look past it.
pub fn tokens(markdown: &str) -> impl Iterator<Item = Result<Token, CompileError>> + '_ {
    Parser::new_ext(markdown, parser_options())
        .into_offset_iter()
        .filter_map(move |(event, range)| match event {
            // Code blocks surface as text events, never as inline code
            Event::Code(_) => TOKEN
                .captures(&markdown[range.clone()])
                .map(|cap| parse_token(&cap, (range.start, range.end))),
            _ => None,
        })
}

fn parse_token(cap: &Captures<'_>, span: (usize, usize)) -> Result<Token, CompileError> {
    let kind = match (cap.get(1), cap.get(2), cap.get(3)) {
        (Some(prefix), Some(tags), _) => {
            let kind = Kind::from_token_prefix(prefix.as_str())
                .ok_or_else(|| malformed(&cap[0], "unknown token prefix"))?;
            TokenKind::Reference {
                kind,
                tags: split_tags(&cap[0], tags.as_str())?,
            }
        }
        (_, _, Some(keyword)) => Kind::from_listing_keyword(keyword.as_str())
            .map(TokenKind::Listing)
            .ok_or_else(|| malformed(&cap[0], "unknown listing"))?,
        _ => return Err(malformed(&cap[0], "unrecognised token")),
    };
    Ok(Token { kind, span })
}

/// Extracts every token, failing on the first malformed one.
///
/// # Examples
///
/// ```
/// use refmark::{extract_tokens, Kind, TokenKind};
///
/// let tokens = extract_tokens("As shown `ref:a,b`.\n\n`references`\n").unwrap();
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[1].kind, TokenKind::Listing(Kind::Citation));
/// ```
pub fn extract_tokens(markdown: &str) -> Result<Vec<Token>, CompileError> {
    tokens(markdown).collect()
}

fn split_tags(token: &str, raw: &str) -> Result<Vec<String>, CompileError> {
    if raw.trim().is_empty() {
        return Err(malformed(token, "empty tag list"));
    }
    raw.split(',')
        .map(|tag| {
            let tag = tag.trim();
            if tag.is_empty() {
                Err(malformed(token, "empty tag in list"))
            } else {
                Ok(tag.to_string())
            }
        })
        .collect()
}

fn malformed(token: &str, reason: &str) -> CompileError {
    CompileError::MalformedToken {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

/// Parser extensions shared by token scanning and HTML rendering.
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH
}
