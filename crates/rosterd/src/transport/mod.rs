//! TCP listener and the hand-off of accepted connections to workers.
//!
//! The acceptor thread owns the listening socket. Each accepted stream is
//! wrapped in a [`Connection`] and moved into a bounded channel drained by a
//! fixed pool of worker threads, so the acceptor gives up the value before it
//! calls `accept` again.

mod errors;
mod handler;
mod listener;
mod pool;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::{Connection, ConnectionHandler};
pub use self::listener::{ListenerHandle, ListenerSettings, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, PanickingHandler, RecordingHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
