//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! output = "dist"             # Output directory (relative to project root)
//! clean = false               # Remove the output directory before building
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    pub output: PathBuf,
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            clean: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::Path;

    #[test]
    fn test_build_config() {
        let config = test_parse_config("[build]\noutput = \"public\"\nclean = true");
        assert_eq!(config.build.output, Path::new("public"));
        assert!(config.build.clean);
    }

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.output, Path::new("dist"));
        assert!(!config.build.clean);
    }
}
