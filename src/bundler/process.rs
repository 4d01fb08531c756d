//! Owned handle to the bundler dev server.
//!
//! ```text
//! start ──► running ──stop──► SIGINT ──exited?──► done
//!                                 │
//!                                 └─ timeout ──► kill ──► done
//! ```
//!
//! Dropping the handle stops the process, so it never outlives the server.

use std::process::Child;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::BundlerConfig;
use crate::utils::exec::Cmd;
use crate::{debug, log};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct DevProcess {
    child: Option<Child>,
    name: String,
    stop_timeout: Duration,
}

impl DevProcess {
    /// Start `<command> run dev` in the bundler directory.
    pub fn start(config: &BundlerConfig) -> Result<Self> {
        let cmd = Cmd::new(&config.command)
            .args(["run", "dev"])
            .cwd(&config.dir);
        let process = Self::spawn(cmd, config.stop_timeout())?;
        log!("bundler"; "dev server starting at {}", config.dev_url);
        Ok(process)
    }

    /// Spawn any command under the same stop protocol.
    pub fn spawn(cmd: Cmd, stop_timeout: Duration) -> Result<Self> {
        let name = cmd.display();
        let child = cmd.spawn()?;
        debug!("bundler"; "spawned `{}` (pid {})", name, child.id());
        Ok(Self {
            child: Some(child),
            name,
            stop_timeout,
        })
    }

    pub fn is_running(&mut self) -> bool {
        self.child
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }

    /// Ask the process to exit, then kill it once the grace period runs out.
    ///
    /// Calling this again after the process is gone is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if child.try_wait()?.is_some() {
            return Ok(());
        }

        if interrupt(&child) {
            let deadline = Instant::now() + self.stop_timeout;
            while Instant::now() < deadline {
                if child.try_wait()?.is_some() {
                    debug!("bundler"; "`{}` exited", self.name);
                    return Ok(());
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            log!("bundler"; "`{}` ignored interrupt, killing", self.name);
        }

        // The process may exit between the last poll and the kill
        if let Err(e) = child.kill()
            && child.try_wait()?.is_none()
        {
            return Err(e).with_context(|| format!("Failed to kill `{}`", self.name));
        }
        child
            .wait()
            .with_context(|| format!("Failed to wait for `{}`", self.name))?;
        Ok(())
    }
}

impl Drop for DevProcess {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log!("bundler"; "{:#}", e);
        }
    }
}

/// Send SIGINT. Returns `false` when no graceful signal could be delivered.
#[cfg(unix)]
fn interrupt(child: &Child) -> bool {
    std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .is_ok_and(|status| status.success())
}

#[cfg(not(unix))]
fn interrupt(_child: &Child) -> bool {
    false
}
