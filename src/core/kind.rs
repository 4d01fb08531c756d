//! Source file classification.

use std::path::Path;

/// What a file under the site root is, and therefore who handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Page template (.vyu), compiled to HTML
    Template,
    /// Script source (.ts/.js/.tsx/.jsx), owned by the bundler
    Script,
    /// Stylesheet (.css), owned by the bundler
    Stylesheet,
    /// Anything else, copied or served as is
    Static,
}

impl SourceKind {
    pub const TEMPLATE_EXTENSION: &'static str = "vyu";

    /// Detect kind from a lowercase file extension, without the dot.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            Self::TEMPLATE_EXTENSION => Self::Template,
            "ts" | "js" | "tsx" | "jsx" => Self::Script,
            "css" => Self::Stylesheet,
            _ => Self::Static,
        }
    }

    /// Detect kind from file path.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Static, |ext| Self::from_extension(&ext.to_ascii_lowercase()))
    }

    /// Whether a change to this file should reload open pages.
    ///
    /// `tsx`/`jsx` sources are left to the bundler's own dev server.
    pub fn is_watched(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some(Self::TEMPLATE_EXTENSION | "css" | "ts" | "js")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("site/index.vyu")), SourceKind::Template);
        assert_eq!(SourceKind::from_path(Path::new("main.tsx")), SourceKind::Script);
        assert_eq!(SourceKind::from_path(Path::new("a/b.css")), SourceKind::Stylesheet);
        assert_eq!(SourceKind::from_path(Path::new("logo.svg")), SourceKind::Static);
        assert_eq!(SourceKind::from_path(Path::new("CNAME")), SourceKind::Static);
    }

    #[test]
    fn test_watched_extensions() {
        for path in ["a.vyu", "a.css", "a.ts", "a.js"] {
            assert!(SourceKind::is_watched(Path::new(path)), "{path}");
        }
        for path in ["a.tsx", "a.jsx", "a.html", "a.vyu.swp", "a"] {
            assert!(!SourceKind::is_watched(Path::new(path)), "{path}");
        }
    }

    #[test]
    fn test_extension_case_ignored() {
        assert_eq!(SourceKind::from_path(Path::new("STYLE.CSS")), SourceKind::Stylesheet);
        assert_eq!(SourceKind::from_path(Path::new("Page.VYU")), SourceKind::Template);
    }
}
