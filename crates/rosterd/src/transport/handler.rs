//! Connection handling abstractions for the daemon listener.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpStream};

use tracing::debug;

use super::LISTENER_TARGET;

/// One accepted client connection, owned by exactly one worker at a time.
///
/// Every connection carries an identifier assigned by the acceptor in accept
/// order; identifiers are never reused within a listener's lifetime.
#[derive(Debug)]
pub struct Connection {
    id: u64,
    peer: SocketAddr,
    stream: TcpStream,
}

impl Connection {
    pub(crate) const fn new(id: u64, peer: SocketAddr, stream: TcpStream) -> Self {
        Self { id, peer, stream }
    }

    /// Identifier assigned by the acceptor.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Remote address of the client.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Buffered reader and writer sharing the underlying socket.
    pub fn split(&self) -> (BufReader<&TcpStream>, BufWriter<&TcpStream>) {
        (BufReader::new(&self.stream), BufWriter::new(&self.stream))
    }

    /// Shuts down both directions of the socket and releases it.
    pub fn close(self) {
        if let Err(error) = self.stream.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            debug!(
                target: LISTENER_TARGET,
                connection = self.id,
                error = %error,
                "socket shutdown failed"
            );
        }
    }
}

/// Handles accepted socket connections.
///
/// The worker that owns the connection closes it once `handle` returns, so
/// implementations only read the request and write the response.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single request. Implementations should avoid panicking.
    fn handle(&self, connection: &Connection);
}
