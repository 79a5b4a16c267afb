//! Error types for socket listener operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The bind address could not be resolved.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no address.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
    },
    /// Binding the listening socket failed.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// The bound socket could not report its address.
    #[error("failed to read listener address: {source}")]
    LocalAddress {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Switching the listener to non-blocking mode failed.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// A listener or worker thread could not be started.
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        /// Name of the thread that failed to start.
        thread: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// `accept` failed for a reason other than interruption.
    #[error("failed to accept connection: {source}")]
    Accept {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Every worker has exited, so connections can no longer be handed off.
    #[error("worker pool is gone; connections can no longer be handed off")]
    WorkersGone,
    /// The listener thread panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}
