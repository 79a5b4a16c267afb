//! Test helpers for the transport module.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use roster_wire::{MAX_TOKEN_BYTES, frame};

use super::{Connection, ConnectionHandler};

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _connection: &Connection) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// What a worker observed for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Observation {
    pub(crate) id: u64,
    pub(crate) peer: SocketAddr,
    pub(crate) tag: String,
}

/// Reads one tag token, records it with the connection's identity and echoes
/// the tag back.
pub(crate) struct RecordingHandler {
    seen: Arc<Mutex<Vec<Observation>>>,
}

impl RecordingHandler {
    pub(crate) fn new() -> (Arc<Mutex<Vec<Observation>>>, Arc<Self>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(Self {
            seen: Arc::clone(&seen),
        });
        (seen, handler)
    }
}

impl ConnectionHandler for RecordingHandler {
    fn handle(&self, connection: &Connection) {
        let (mut reader, mut writer) = connection.split();
        let Ok(tag) = frame::read_text(&mut reader, MAX_TOKEN_BYTES) else {
            return;
        };
        self.seen
            .lock()
            .expect("observation lock")
            .push(Observation {
                id: connection.id(),
                peer: connection.peer(),
                tag: tag.clone(),
            });
        let _ = frame::write_frame(&mut writer, tag.as_bytes());
        let _ = writer.flush();
    }
}

/// Panics on the first connection and counts every later one.
pub(crate) struct PanickingHandler {
    calls: Arc<AtomicUsize>,
}

impl PanickingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            calls: Arc::clone(&calls),
        });
        (calls, handler)
    }
}

impl ConnectionHandler for PanickingHandler {
    fn handle(&self, _connection: &Connection) {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("handler failure");
        }
    }
}
