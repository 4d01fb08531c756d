//! Compile error types.

use std::path::PathBuf;
use thiserror::Error;

/// Structural errors found while splitting a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unclosed declarations block")]
    UnclosedDeclarations,

    #[error("unclosed expression starting at offset {0}")]
    UnclosedExpression(usize),
}

/// Failure reported by the script engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Any failure that aborts a single template compile.
///
/// No variant ever carries partial output.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("parse error in {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("script setup failed in {}: {source}", path.display())]
    Setup { path: PathBuf, source: ScriptError },

    #[error("declarations error in {}: {source}", path.display())]
    Declaration { path: PathBuf, source: ScriptError },

    #[error("evaluation error in {}: error evaluating expression '{expr}': {source}", path.display())]
    Evaluation {
        path: PathBuf,
        expr: String,
        source: ScriptError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_names_expression() {
        let err = CompileError::Evaluation {
            path: PathBuf::from("site/index.vyu"),
            expr: "missing.field".into(),
            source: ScriptError::new("ReferenceError: missing is not defined"),
        };
        let text = err.to_string();
        assert!(text.contains("site/index.vyu"));
        assert!(text.contains("'missing.field'"));
        assert!(text.contains("ReferenceError"));
    }

    #[test]
    fn test_parse_error_offset() {
        assert_eq!(
            ParseError::UnclosedExpression(42).to_string(),
            "unclosed expression starting at offset 42"
        );
    }
}
