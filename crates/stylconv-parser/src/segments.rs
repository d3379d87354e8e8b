//! Raw-text helpers for selectors and property names.
//!
//! Selector text is kept verbatim apart from `{name}` interpolation, which
//! becomes an interpolated identifier segment.

use crate::ast::{Ident, Literal, Node};
use crate::ParseError;

/// Split `a, b:not(.c, .d)` on commas outside parentheses, brackets and quotes.
pub(crate) fn split_selector_list(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Split raw text into literal and `{interpolated}` segments.
pub(crate) fn split_segments(
    text: &str,
    lineno: usize,
    column: usize,
) -> Result<Vec<Node>, ParseError> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Node::Literal(Literal::new(&rest[..open], lineno)));
        }
        let Some(close) = rest[open..].find('}') else {
            return Err(ParseError {
                message: format!("Unterminated interpolation in '{text}'"),
                line: lineno,
                column,
            });
        };
        let name = rest[open + 1..open + close].trim();
        if name.is_empty() {
            return Err(ParseError {
                message: format!("Empty interpolation in '{text}'"),
                line: lineno,
                column,
            });
        }
        segments.push(Node::Ident(Ident {
            interpolated: true,
            ..Ident::new(name, lineno)
        }));
        rest = &rest[open + close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Node::Literal(Literal::new(rest, lineno)));
    }

    Ok(segments)
}
