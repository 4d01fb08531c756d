//! Lexical path arithmetic.
//!
//! Nothing here touches the filesystem, so results are the same whether or
//! not the paths exist.

use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into its parent where possible.
///
/// `..` at the start of a relative path is kept; `..` above the root of an
/// absolute path is dropped. An empty result becomes `.`.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Express `path` relative to `base`, lexically.
///
/// Returns `None` when one path is absolute and the other is not, or when
/// `base` climbs out through `..` so no relative form exists.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = clean(path);
    let base = clean(base);

    if path.is_absolute() != base.is_absolute() {
        return None;
    }

    let path_parts: Vec<_> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base_parts: Vec<_> = base.components().filter(|c| *c != Component::CurDir).collect();

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for part in &base_parts[common..] {
        if *part == Component::ParentDir {
            return None;
        }
        out.push("..");
    }
    for part in &path_parts[common..] {
        out.push(part.as_os_str());
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    Some(out)
}

/// Join the components of a relative path with `/`, whatever the platform.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
