//! Vaayu - a page-template compiler and live-reloading dev server.

mod bundler;
mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod utils;
mod watcher;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_site(&config).map(|_| ()),
        Commands::Serve { .. } => cli::serve::serve_site(&config),
    }
}
