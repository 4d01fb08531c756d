//! Project configuration management for `vaayu.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── bundler    # [bundler]
//! │   ├── serve      # [serve]
//! │   └── site       # [site]
//! ├── types/         # ConfigError
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The file is optional. Without one every section takes its defaults and
//! the current directory is the project root.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, is_http_url};

pub use section::{BuildSectionConfig, BundlerConfig, ServeConfig, SiteSectionConfig};
pub use types::ConfigError;

use crate::{
    cli::{BundlerArgs, Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing vaayu.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub bundler: BundlerConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration for `cli`, searching upward from the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    /// Load configuration, searching upward from `cwd`.
    ///
    /// The project root is the config file's directory, or `cwd` when there
    /// is no config file.
    pub fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let config_path = find_config_file(&cli.config, cwd);

        let mut config = match &config_path {
            Some(path) => {
                crate::debug!("config"; "loading {}", path.display());
                Self::from_path(path)?
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(cwd)
            .to_path_buf();

        config.config_path = config_path;
        config.normalize_paths(&root);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Location of the bundler manifest inside the output directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.build.output.join(&self.bundler.manifest)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { clean, bundler } => {
                self.build.clean |= *clean;
                self.apply_bundler_args(bundler);
            }
            Commands::Serve {
                interface,
                port,
                watch,
                bundler,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                self.apply_bundler_args(bundler);
            }
        }
    }

    fn apply_bundler_args(&mut self, args: &BundlerArgs) {
        if args.no_bundler {
            self.bundler.enable = false;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every configured directory against the project root.
    fn normalize_paths(&mut self, root: &Path) {
        use crate::utils::path::normalize_path;

        let root = normalize_path(root);
        self.site.dir = normalize_path(&root.join(&self.site.dir));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.bundler.dir = normalize_path(&root.join(&self.bundler.dir));
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.dir.is_dir() {
            return Err(ConfigError::Validation(format!(
                "[site] dir `{}` is not a directory",
                self.site.dir.display()
            )));
        }

        if self.bundler.enable && !is_http_url(&self.bundler.dev_url) {
            return Err(ConfigError::Validation(format!(
                "[bundler] dev_url `{}` must be an absolute http(s) URL",
                self.bundler.dev_url
            )));
        }

        if self.bundler.manifest.is_absolute() {
            return Err(ConfigError::Validation(
                "[bundler] manifest must be relative to the output directory".into(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
