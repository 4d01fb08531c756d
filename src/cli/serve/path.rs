//! Request URL to site file resolution.
//!
//! ```text
//! /              -> index.vyu
//! /about         -> about.vyu
//! /about.html    -> about.vyu
//! /blog/         -> blog/index.vyu
//! /logo.svg      -> logo.svg              (no logo.svg.vyu)
//! /../secret     -> not found
//! ```

use std::path::{Component, Path, PathBuf};

use crate::core::SourceKind;

/// What a request URL refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Template to compile
    Page(PathBuf),
    /// File to serve as is
    Static(PathBuf),
    NotFound,
}

/// Resolve `url` (path plus optional query) against `site_dir`.
pub fn resolve(url: &str, site_dir: &Path) -> Target {
    let Some(path) = decode_path(url) else {
        return Target::NotFound;
    };
    let relative = path.trim_start_matches('/');
    if !is_contained(Path::new(relative)) {
        return Target::NotFound;
    }

    let page = site_dir.join(format!(
        "{}.{}",
        page_stem(relative),
        SourceKind::TEMPLATE_EXTENSION
    ));
    if page.is_file() {
        return Target::Page(page);
    }

    static_file(site_dir, relative).map_or(Target::NotFound, Target::Static)
}

/// Template path stem for a URL path, without extension.
fn page_stem(relative: &str) -> String {
    if relative.is_empty() || relative.ends_with('/') {
        return format!("{relative}index");
    }
    relative
        .strip_suffix(".html")
        .unwrap_or(relative)
        .to_string()
}

/// A regular file under the site root, with symlinks resolved.
fn static_file(site_dir: &Path, relative: &str) -> Option<PathBuf> {
    if relative.is_empty() {
        return None;
    }
    let canonical = site_dir.join(relative).canonicalize().ok()?;
    let root = site_dir.canonicalize().ok()?;
    (canonical.starts_with(&root) && canonical.is_file()).then_some(canonical)
}

/// Percent-decoded path without query string or fragment.
fn decode_path(url: &str) -> Option<String> {
    use percent_encoding::percent_decode_str;

    let end = url.find(['?', '#']).unwrap_or(url.len());
    let decoded = percent_decode_str(&url[..end]).decode_utf8().ok()?;
    (!decoded.contains('\0')).then(|| decoded.into_owned())
}

/// Only plain names; no `..`, roots or drive prefixes.
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
