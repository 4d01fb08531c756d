//! Live reload for development.
//!
//! ```text
//! Watcher ──batch──► Broadcaster::broadcast ──try_send──► ClientHandle ──► SSE stream ──► browser
//! ```
//!
//! The browser side is the inline script in [`crate::embed::serve`]. It only
//! understands one instruction, so a coalesced signal is as good as many.

mod broadcaster;

pub use broadcaster::{Broadcaster, ClientHandle, Signal};

/// Payloads written to a live-reload stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    /// Handshake sent once when the stream opens
    Connected,
    /// Sources changed; reload the page
    Reload,
    /// Comment line that keeps the connection alive and detects closed clients
    Ping,
}

impl StreamEvent {
    /// Wire form, including the blank line that terminates an event.
    pub const fn as_sse(self) -> &'static str {
        match self {
            Self::Connected => "data: connected\n\n",
            Self::Reload => "data: reload\n\n",
            Self::Ping => ": ping\n\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_framing() {
        assert_eq!(StreamEvent::Connected.as_sse(), "data: connected\n\n");
        assert_eq!(StreamEvent::Reload.as_sse(), "data: reload\n\n");
        assert!(StreamEvent::Ping.as_sse().starts_with(':'));
    }
}
