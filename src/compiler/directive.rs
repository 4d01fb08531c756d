//! Import directive recognition.
//!
//! A directive is exactly one call with one quoted literal:
//!
//! ```text
//! importCSS("./style.css")    importJS('./main.ts')
//! ```
//!
//! Anything else (computed argument, extra argument, trailing code) is an
//! ordinary expression and is left to the script engine.

use regex::Regex;
use std::sync::LazyLock;

/// Host function that records a stylesheet import.
pub const IMPORT_CSS: &str = "importCSS";
/// Host function that records a module script import.
pub const IMPORT_JS: &str = "importJS";

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(importCSS|importJS)\(\s*(?:"([^"\\]*)"|'([^'\\]*)')\s*\)$"#)
        .expect("directive pattern is valid")
});

/// Kind of asset an import directive refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Css,
    Js,
}

/// A recognized import directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: ImportKind,
    pub path: &'a str,
}

/// Recognize `raw` (already trimmed expression text) as an import directive.
pub fn recognize(raw: &str) -> Option<Directive<'_>> {
    let caps = DIRECTIVE.captures(raw.trim())?;
    let kind = match caps.get(1)?.as_str() {
        IMPORT_CSS => ImportKind::Css,
        _ => ImportKind::Js,
    };
    let path = caps.get(2).or_else(|| caps.get(3))?.as_str();
    Some(Directive { kind, path })
}
