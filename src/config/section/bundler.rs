//! `[bundler]` section configuration.
//!
//! Settings for the external asset bundler (a Vite project by default).
//!
//! # Example
//!
//! ```toml
//! [bundler]
//! enable = true                       # Run the bundler at all
//! dir = "vite"                        # Bundler project (relative to project root)
//! command = "npm"                     # Package manager used to drive it
//! dev_url = "http://localhost:5173"   # Dev server base URL for asset tags
//! manifest = ".vite/manifest.json"    # Manifest (relative to [build] output)
//! stop_timeout_ms = 3000              # Grace period before the dev server is killed
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    pub enable: bool,
    pub dir: PathBuf,
    pub command: String,
    pub dev_url: String,
    pub manifest: PathBuf,
    pub stop_timeout_ms: u64,
}

impl BundlerConfig {
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            dir: PathBuf::from("vite"),
            command: "npm".to_string(),
            dev_url: "http://localhost:5173".to_string(),
            manifest: PathBuf::from(".vite/manifest.json"),
            stop_timeout_ms: 3000,
        }
    }
}
