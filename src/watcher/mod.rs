//! Filesystem watcher with debounced change notification.
//!
//! ```text
//! notify ──► mpsc ──► loop (owns Debouncer) ──100ms quiet──► on_change(paths)
//!                       ▲
//!                  stop signal
//! ```
//!
//! Every directory under the root is registered individually when the
//! watcher starts. Directories created afterwards are not observed.

mod debouncer;


use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Instant;

use jwalk::WalkDir;
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::core::SourceKind;
use crate::{debug, log};
use debouncer::{DEBOUNCE, Debouncer};

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to watch `{}`", .0.display())]
    Watch(PathBuf, #[source] notify::Error),

    #[error(transparent)]
    Notify(#[from] notify::Error),

    #[error("failed to start watcher thread")]
    Thread(#[source] std::io::Error),
}

/// Running watcher. Stops on [`Watcher::stop`] or drop.
pub struct Watcher {
    stop_tx: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Watch `root` and call `on_change` with each debounced batch of changed
    /// template, stylesheet and script paths.
    pub fn start<F>(root: &Path, on_change: F) -> Result<Self, WatcherError>
    where
        F: FnMut(Vec<PathBuf>) + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })?;

        let dirs = watch_dirs(&mut watcher, root)?;
        debug!("watch"; "watching {} directories under {}", dirs, root.display());

        let (stop_tx, stop_rx) = oneshot::channel();
        let thread = std::thread::Builder::new()
            .name("vaayu-watcher".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        log!("watch"; "failed to start runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(run(event_rx, stop_rx, on_change));
                // Observation ends here, not at some later drop
                drop(watcher);
            })
            .map_err(WatcherError::Thread)?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Halt observation and wait for the background loop to exit.
    ///
    /// A batch still inside its quiet period is discarded.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log!("watch"; "watcher thread panicked");
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Register `root` and every directory below it. Returns how many were added.
fn watch_dirs(watcher: &mut RecommendedWatcher, root: &Path) -> Result<usize, WatcherError> {
    let mut count = 0;
    for entry in WalkDir::new(root).skip_hidden(false).into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log!("watch"; "skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatcherError::Watch(dir, e))?;
        count += 1;
    }
    Ok(count)
}

/// Event loop. Sole owner of the debouncer, so a pending batch can never be
/// rescheduled and fired at the same time.
async fn run<F>(
    mut events: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    mut stop: oneshot::Receiver<()>,
    mut on_change: F,
) where
    F: FnMut(Vec<PathBuf>),
{
    let mut debouncer = Debouncer::new(DEBOUNCE);

    loop {
        let sleep = tokio::time::sleep(debouncer.sleep_duration(Instant::now()));

        tokio::select! {
            biased;
            _ = &mut stop => break,
            event = events.recv() => match event {
                Some(Ok(event)) => {
                    for path in relevant_paths(&event) {
                        debug!("watch"; "{:?}: {}", event.kind, path.display());
                        debouncer.add(path.clone(), Instant::now());
                    }
                }
                Some(Err(e)) => log!("watch"; "notify error: {}", e),
                None => break,
            },
            () = sleep, if debouncer.is_pending() => {
                if let Some(paths) = debouncer.take_if_ready(Instant::now())
                    && !paths.is_empty()
                {
                    on_change(paths);
                }
            }
        }
    }
}

/// Paths of `event` that should trigger a reload.
///
/// Creates, content writes and removals of watched source kinds count.
/// A rename counts for the name the file ends up with; metadata-only
/// changes never count.
fn relevant_paths(event: &notify::Event) -> impl Iterator<Item = &PathBuf> {
    let paths: &[PathBuf] = match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => &event.paths,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => &event.paths,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event.paths.get(1..).unwrap_or_default(),
        EventKind::Modify(ModifyKind::Metadata(_) | ModifyKind::Name(_)) => &[],
        EventKind::Modify(_) => &event.paths,
        _ => &[],
    };
    paths.iter().filter(|path| SourceKind::is_watched(path))
}
