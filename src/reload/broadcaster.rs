//! Registry of connected live-reload clients.
//!
//! Each client owns a single-slot channel. Broadcasting `try_send`s into
//! every slot under a read lock: a full slot already holds a reload the
//! client has not consumed yet, so the new one is dropped and the
//! broadcaster moves on without waiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::debug;

/// Outcome of waiting on a client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Reload,
    /// Nothing arrived within the timeout
    Idle,
    /// The broadcaster was closed
    Closed,
}

#[derive(Debug, Default)]
pub struct Broadcaster {
    clients: RwLock<FxHashMap<u64, Sender<()>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl Broadcaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a client. It is removed again when the handle drops.
    ///
    /// After [`close`](Self::close) the returned handle is already closed.
    pub fn connect(self: &Arc<Self>) -> ClientHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = channel::bounded(1);

        {
            let mut clients = self.clients.write();
            // Checked under the lock so close() cannot miss this client
            if !self.closed.load(Ordering::SeqCst) {
                clients.insert(id, tx);
            }
        }

        debug!("reload"; "client {} connected", id);
        ClientHandle {
            id,
            rx,
            registry: Arc::clone(self),
        }
    }

    /// Signal every client. Never blocks on a slow client.
    ///
    /// Returns how many clients got a new signal.
    pub fn broadcast(&self) -> usize {
        let clients = self.clients.read();
        let mut delivered = 0;
        for tx in clients.values() {
            match tx.try_send(()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(())) | Err(TrySendError::Disconnected(())) => {}
            }
        }
        debug!("reload"; "signalled {}/{} clients", delivered, clients.len());
        delivered
    }

    /// Drop every client slot so open streams end. Later connects are closed.
    pub fn close(&self) {
        let mut clients = self.clients.write();
        self.closed.store(true, Ordering::SeqCst);
        clients.clear();
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.clients.write().remove(&id);
    }
}

/// One connected client. Deregisters on drop.
#[derive(Debug)]
pub struct ClientHandle {
    id: u64,
    rx: Receiver<()>,
    registry: Arc<Broadcaster>,
}

impl ClientHandle {
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait up to `timeout` for the next signal.
    pub fn wait(&self, timeout: Duration) -> Signal {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => Signal::Reload,
            Err(RecvTimeoutError::Timeout) => Signal::Idle,
            Err(RecvTimeoutError::Disconnected) => Signal::Closed,
        }
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.registry.remove(self.id);
        debug!("reload"; "client {} disconnected", self.id);
    }
}
