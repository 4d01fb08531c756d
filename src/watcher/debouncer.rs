use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Quiet period after the last qualifying event.
pub(super) const DEBOUNCE: Duration = Duration::from_millis(100);

/// Pure debouncer: timing and path deduplication only.
///
/// Every event pushes the deadline to `last_event + quiet`, so a burst
/// collapses into one batch released once the burst has been quiet long
/// enough. Time is passed in, never read.
pub(super) struct Debouncer {
    pub(super) changes: Vec<PathBuf>,
    pub(super) last_event: Option<Instant>,
    quiet: Duration,
}

impl Debouncer {
    pub(super) fn new(quiet: Duration) -> Self {
        Self {
            changes: Vec::new(),
            last_event: None,
            quiet,
        }
    }

    /// Record a change, restarting the quiet period.
    pub(super) fn add(&mut self, path: PathBuf, now: Instant) {
        if !self.changes.contains(&path) {
            self.changes.push(path);
        }
        self.last_event = Some(now);
    }

    pub(super) fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    pub(super) fn is_ready(&self, now: Instant) -> bool {
        self.last_event
            .is_some_and(|last| now.saturating_duration_since(last) >= self.quiet)
    }

    /// Release the batch once the quiet period has elapsed.
    pub(super) fn take_if_ready(&mut self, now: Instant) -> Option<Vec<PathBuf>> {
        if !self.is_ready(now) {
            return None;
        }
        self.last_event = None;
        Some(std::mem::take(&mut self.changes))
    }

    /// Time left until the pending batch is due.
    pub(super) fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(last) = self.last_event else {
            return Duration::from_secs(86400);
        };
        self.quiet
            .saturating_sub(now.saturating_duration_since(last))
            .max(Duration::from_millis(1))
    }
}
