//! Asset URL resolution for import directives.
//!
//! ```text
//! "./main.ts" in site/blog/post.vyu, site root "site"
//!   -> "blog/main.ts"
//!   dev:   http://localhost:5173/blog/main.ts
//!   build: /assets/main-4f2a.js      (manifest hit)
//!          /blog/main.ts             (manifest miss)
//! ```

use std::path::Path;

use super::CompileOptions;
use crate::utils::path::{clean, relative_to, to_url_path};

/// Compute the URL an asset tag should point at.
///
/// `file` is the template being compiled. A manifest miss is not an error:
/// the asset was simply not processed by the bundler.
pub fn resolve_asset_url(path: &str, file: &Path, opts: &CompileOptions) -> String {
    let resolved = site_relative(path, file, &opts.site_root);
    let resolved = resolved.strip_prefix("./").unwrap_or(&resolved);

    if opts.dev_mode {
        let base = opts
            .dev_server_url
            .strip_suffix('/')
            .unwrap_or(&opts.dev_server_url);
        return format!("{base}/{resolved}");
    }

    match opts.manifest.get(resolved) {
        Some(output) => format!("/{output}"),
        None => format!("/{resolved}"),
    }
}

/// Re-express a `./` or `../` path relative to the site root.
///
/// Paths without a relative marker, and paths that cannot be expressed
/// relative to the root, come back unchanged.
fn site_relative(path: &str, file: &Path, site_root: &Path) -> String {
    if !(path.starts_with("./") || path.starts_with("../")) {
        return path.to_string();
    }

    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    let joined = clean(&dir.join(path));

    match relative_to(&joined, site_root) {
        Some(rel) => to_url_path(&rel),
        None => path.to_string(),
    }
}
