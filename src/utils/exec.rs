//! External command execution.
//!
//! Two shapes are needed by the bundler integration:
//!
//! - [`Cmd::run`] runs to completion with captured output, logging whatever
//!   survives the [`FilterRule`] and failing on a non-zero exit.
//! - [`Cmd::spawn`] starts a long-lived child whose output goes straight to
//!   the terminal (the bundler dev server).
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! Cmd::new("npm").args(["run", "build"]).cwd(vite_dir).run()?;
//! let child = Cmd::new("npm").args(["run", "dev"]).cwd(vite_dir).spawn()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    sync::LazyLock,
};

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are skipped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Program plus arguments, for messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run to completion, capturing output.
    pub fn run(self) -> Result<Output> {
        let name = self.display();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        let output = self
            .command()
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output, filter));
        }

        let program = self.program.to_string_lossy();
        filter.log(&program, String::from_utf8_lossy(&output.stdout).trim());
        filter.log(&program, String::from_utf8_lossy(&output.stderr).trim());
        Ok(output)
    }

    /// Start without waiting. The child shares this process's terminal.
    pub fn spawn(self) -> Result<Child> {
        let name = self.display();
        self.command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Prefixes of output lines not worth logging.
#[derive(Debug)]
pub struct FilterRule {
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                !self.should_skip(plain.trim())
            })
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ansi pattern is valid"));
    RE.replace_all(s, "")
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);

    let stderr: Vec<_> = stderr
        .lines()
        .filter(|line| !filter.should_skip(strip_ansi(line).trim()))
        .collect();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr.join("\n"));
    }

    let stdout = stdout.trim();
    if !stdout.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("npm").arg("run").args(["", "build"]).cwd("/tmp");
        assert_eq!(cmd.args.len(), 2);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(cmd.display(), "npm run build");
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["npm notice", ">"]);
        assert!(filter.should_skip("npm notice New version"));
        assert!(filter.should_skip("> vite build"));
        assert!(!filter.should_skip("error: missing script"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[32mbuilt in 80ms\x1b[0m"), "built in 80ms");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_success_and_failure() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));

        let err = Cmd::new("sh").args(["-c", "echo broken >&2; exit 3"]).run().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("sh -c"), "{text}");
        assert!(text.contains("broken"), "{text}");
    }

    #[test]
    fn test_spawn_missing_program() {
        assert!(Cmd::new("vaayu-no-such-program").spawn().is_err());
    }
}
