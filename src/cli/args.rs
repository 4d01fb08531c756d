//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Vaayu page compiler and development server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "vaayu.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile every page and copy static files into the output directory
    #[command(visible_alias = "b")]
    Build {
        /// Remove the output directory before building
        #[arg(short, long)]
        clean: bool,

        #[command(flatten)]
        bundler: BundlerArgs,
    },

    /// Start the development server with live reload
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Reload connected browsers when sources change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        #[command(flatten)]
        bundler: BundlerArgs,
    },
}

/// Shared bundler arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BundlerArgs {
    /// Do not run the external asset bundler
    #[arg(long)]
    pub no_bundler: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["vaayu", "serve", "-p", "8080", "-w", "false", "--no-bundler"]);
        match cli.command {
            Commands::Serve {
                port,
                watch,
                interface,
                bundler,
            } => {
                assert_eq!(port, Some(8080));
                assert_eq!(watch, Some(false));
                assert!(interface.is_none());
                assert!(bundler.no_bundler);
            }
            Commands::Build { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_build_with_globals() {
        let cli = Cli::parse_from(["vaayu", "build", "--clean", "-V", "-C", "site.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert!(matches!(cli.command, Commands::Build { clean: true, .. }));
    }

    #[test]
    fn test_watch_flag_without_value() {
        let cli = Cli::parse_from(["vaayu", "serve", "--watch"]);
        assert!(matches!(cli.command, Commands::Serve { watch: Some(true), .. }));
    }
}
