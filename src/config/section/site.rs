//! `[site]` section configuration.
//!
//! ```toml
//! [site]
//! dir = "site"                # Pages, assets and static files (relative to project root)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Site root. Every `.vyu` file under it is a page.
    pub dir: PathBuf,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("site"),
        }
    }
}
