//! Registry of live real-time connections.
//!
//! Each connection is represented by the sending half of its outbound queue.
//! Registration returns a [`ConnectionHandle`]; dropping (or
//! [`ConnectionHandle::unregister`]-ing) the handle removes the entry, so every
//! register is paired with exactly one unregister on the connection's own
//! teardown path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Outbound side of one real-time connection.
#[derive(Debug)]
pub struct Connection {
    id: Uuid,
    user_id: Option<Uuid>,
    tx: mpsc::UnboundedSender<String>,
}

impl Connection {
    /// New connection plus the receiver its writer task drains.
    pub fn new(user_id: Option<Uuid>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                user_id,
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Queue a frame. Never blocks; `false` once the writer side is gone.
    pub fn send(&self, frame: String) -> bool {
        self.tx.send(frame).is_ok()
    }
}

type Entries = HashMap<Uuid, Connection>;

/// Process-wide set of live connections. Cheap to clone; clones share entries.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    entries: Arc<Mutex<Entries>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection: Connection) -> ConnectionHandle {
        let id = connection.id;
        lock(&self.entries).insert(id, connection);
        debug!(connection_id = %id, "connection registered");
        ConnectionHandle {
            id,
            entries: Arc::clone(&self.entries),
        }
    }

    /// Visit every registered connection. The registry stays locked for the
    /// whole pass, so `f` must not block or await.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Connection),
    {
        let entries = lock(&self.entries);
        for connection in entries.values() {
            f(connection);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps a connection registered for as long as it lives.
#[derive(Debug)]
pub struct ConnectionHandle {
    id: Uuid,
    entries: Arc<Mutex<Entries>>,
}

impl ConnectionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn unregister(self) {
        drop(self);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if lock(&self.entries).remove(&self.id).is_some() {
            debug!(connection_id = %self.id, "connection unregistered");
        }
    }
}
