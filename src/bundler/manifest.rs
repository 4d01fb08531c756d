//! Bundler manifest reading.
//!
//! The bundler writes one record per processed source:
//!
//! ```json
//! {
//!   "main.ts": { "file": "assets/main-4f2a.js", "src": "main.ts", "isEntry": true,
//!                "css": ["assets/main-9c1e.css"] }
//! }
//! ```
//!
//! Compiles only need the flattened [`ManifestMap`]: `main.ts -> assets/main-4f2a.js`
//! and `main.ts.css -> assets/main-9c1e.css`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::log;

/// Source asset path to built output path.
pub type ManifestMap = FxHashMap<String, String>;

/// One processed source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Built output file, relative to the output root.
    pub file: String,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub is_entry: bool,
    /// Stylesheets extracted from this source.
    #[serde(default)]
    pub css: Vec<String>,
}

/// Full manifest, keyed by source path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub BTreeMap<String, ManifestEntry>);

impl Manifest {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Flatten into the lookup used by asset resolution.
    ///
    /// Each companion stylesheet is exposed under `<src>.css`; when a source
    /// has several, the last one listed wins.
    pub fn to_map(&self) -> ManifestMap {
        let mut map = ManifestMap::default();
        for (src, entry) in &self.0 {
            map.insert(src.clone(), entry.file.clone());
            for css in &entry.css {
                map.insert(format!("{src}.css"), css.clone());
            }
        }
        map
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse manifest `{}`", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Read and flatten the manifest at `path`.
pub fn read_manifest(path: &Path) -> Result<ManifestMap, ManifestError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| ManifestError::Read(path.to_path_buf(), e))?;
    let manifest = Manifest::parse(&text).map_err(|e| ManifestError::Parse(path.to_path_buf(), e))?;
    Ok(manifest.to_map())
}

/// Like [`read_manifest`], but a missing or broken manifest only warns.
///
/// Pages still render without it; their asset URLs just stay unresolved.
pub fn load_or_empty(path: &Path) -> ManifestMap {
    match read_manifest(path) {
        Ok(map) => map,
        Err(e) => {
            let cause = std::error::Error::source(&e)
                .map(|s| format!(": {s}"))
                .unwrap_or_default();
            log!("warn"; "{e}{cause}, asset URLs will not be rewritten");
            ManifestMap::default()
        }
    }
}
