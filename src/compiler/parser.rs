//! Template splitting: declarations block, body, expression markers.
//!
//! ```text
//! {{ const title = 'Home'; }}      <- declarations (first non-whitespace only)
//! <h1>{{ title }}</h1>             <- body with one expression marker
//! ```

use super::error::ParseError;
use super::scanner::{CLOSE, OPEN, find_matching_close};

/// A template split into its parts. Owned by one compile, then discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Script run once before any expression (trimmed, may be empty).
    pub declarations: String,
    /// Markup containing the expression markers.
    pub body: String,
    /// Markers in source order.
    pub expressions: Vec<Expression>,
}

/// One `{{ ... }}` marker inside the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// Trimmed text between the delimiters.
    pub raw: String,
    /// Byte offset of the opening `{{` in `body`.
    pub start: usize,
    /// Byte offset just past the closing `}}` in `body`.
    pub end: usize,
}

impl Expression {
    /// Span of the whole marker, delimiters included.
    #[inline]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Parse template source.
pub fn parse(source: &str) -> Result<ParsedTemplate, ParseError> {
    let trimmed = source.trim_start();

    let (declarations, body) = if trimmed.starts_with(OPEN) {
        let close =
            find_matching_close(trimmed, OPEN.len()).ok_or(ParseError::UnclosedDeclarations)?;
        (
            trimmed[OPEN.len()..close].trim().to_string(),
            trimmed[close + CLOSE.len()..].to_string(),
        )
    } else {
        (String::new(), source.to_string())
    };

    let expressions = find_expressions(&body)?;

    Ok(ParsedTemplate {
        declarations,
        body,
        expressions,
    })
}

/// Collect sibling markers left to right.
///
/// Scanning resumes after each close, so a marker is never searched for
/// inside another one.
fn find_expressions(body: &str) -> Result<Vec<Expression>, ParseError> {
    let mut expressions = Vec::new();
    let mut cursor = 0;

    while let Some(found) = body[cursor..].find(OPEN) {
        let start = cursor + found;
        let inner = start + OPEN.len();
        let close =
            find_matching_close(body, inner).ok_or(ParseError::UnclosedExpression(start))?;
        let end = close + CLOSE.len();

        expressions.push(Expression {
            raw: body[inner..close].trim().to_string(),
            start,
            end,
        });
        cursor = end;
    }

    Ok(expressions)
}
