//! Live-reload event stream.
//!
//! tiny_http buffers chunked bodies, so the stream bypasses its response
//! type: headers are written by hand and every event is flushed as soon as
//! it is produced.

use crate::core::is_shutdown;
use crate::debug;
use crate::reload::{Broadcaster, ClientHandle, Signal, StreamEvent};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tiny_http::Request;

/// Idle interval after which a comment line is sent to detect dead clients.
pub const HEARTBEAT: Duration = Duration::from_secs(15);

const HEAD: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/event-stream\r\n\
Cache-Control: no-cache\r\n\
Connection: keep-alive\r\n\
Access-Control-Allow-Origin: *\r\n\
\r\n";

/// Serve one live-reload client until it disconnects or the server stops.
pub fn stream(request: Request, broadcaster: &Arc<Broadcaster>) {
    let handle = broadcaster.connect();
    let id = handle.id();

    let mut writer = request.into_writer();
    let result = stream_to(&mut writer, &handle, HEARTBEAT);

    drop(handle);
    match result {
        Ok(()) => debug!("reload"; "client {} closed", id),
        Err(e) => debug!("reload"; "client {} gone: {}", id, e),
    }
}

/// Write the response head, a `connected` event, then one event per signal.
pub fn stream_to<W: Write>(writer: &mut W, handle: &ClientHandle, heartbeat: Duration) -> io::Result<()> {
    writer.write_all(HEAD.as_bytes())?;
    send(writer, StreamEvent::Connected)?;

    loop {
        let event = match handle.wait(heartbeat) {
            Signal::Reload => StreamEvent::Reload,
            Signal::Idle => StreamEvent::Ping,
            Signal::Closed => return Ok(()),
        };
        if is_shutdown() {
            return Ok(());
        }
        send(writer, event)?;
    }
}

fn send<W: Write>(writer: &mut W, event: StreamEvent) -> io::Result<()> {
    writer.write_all(event.as_sse().as_bytes())?;
    writer.flush()
}
