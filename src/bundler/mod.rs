//! External asset bundler integration.
//!
//! The bundler (Vite, driven through a package manager) owns every script
//! and stylesheet. Vaayu only runs it and reads back where things landed:
//!
//! | Operation            | Command              | When                       |
//! |----------------------|----------------------|----------------------------|
//! | [`ensure_installed`] | `<cmd> install`      | `node_modules` is missing  |
//! | [`build`]            | `<cmd> run build`    | `vaayu build`              |
//! | [`DevProcess`]       | `<cmd> run dev`      | lifetime of `vaayu serve`  |

pub mod manifest;
mod process;

pub use process::DevProcess;

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::BundlerConfig;
use crate::log;
use crate::utils::exec::{Cmd, FilterRule};

/// Package manager chatter not worth echoing.
static NPM_FILTER: FilterRule = FilterRule::new(&["npm notice", "npm warn", ">"]);

/// Install bundler dependencies unless already present.
pub fn ensure_installed(config: &BundlerConfig) -> Result<()> {
    if config.dir.join("node_modules").is_dir() {
        return Ok(());
    }

    log!("bundler"; "installing dependencies in {}", config.dir.display());
    Cmd::new(&config.command)
        .arg("install")
        .cwd(&config.dir)
        .filter(&NPM_FILTER)
        .run()
        .with_context(|| format!("{} install failed", config.command))?;
    Ok(())
}

/// Run the production bundle into `output`.
pub fn build(config: &BundlerConfig, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory `{}`", output.display()))?;

    log!("bundler"; "building assets");
    Cmd::new(&config.command)
        .args(["run", "build"])
        .cwd(&config.dir)
        .filter(&NPM_FILTER)
        .run()
        .context("bundler build failed")?;
    Ok(())
}
