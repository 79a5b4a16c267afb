//! Listener implementation for the daemon's TCP socket.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::pool::{HandOffError, WorkerPool};
use super::{Connection, ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// Sizing and timeouts applied to accepted connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSettings {
    /// Worker threads serving connections.
    pub workers: usize,
    /// Connections allowed to wait for a free worker.
    pub backlog: usize,
    /// Read and write timeout for each connection; `None` disables it.
    pub io_timeout: Option<Duration>,
}

impl ListenerSettings {
    /// Derives the settings from the daemon configuration.
    #[must_use]
    pub fn from_config(config: &roster_config::Config) -> Self {
        Self {
            workers: config.workers(),
            backlog: config.backlog(),
            io_timeout: config.io_timeout(),
        }
    }
}

/// Listener bound to a TCP address.
#[derive(Debug)]
pub struct SocketListener {
    address: SocketAddr,
    listener: TcpListener,
}

impl SocketListener {
    /// Resolves `host:port` and binds the first address it yields.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when resolution or binding fails.
    pub fn bind(host: &str, port: u16) -> Result<Self, ListenerError> {
        let mut addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| ListenerError::Resolve {
                host: host.to_owned(),
                port,
                source,
            })?;
        let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
        let listener =
            TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })?;
        let address = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddress { source })?;
        Ok(Self { address, listener })
    }

    /// Address the socket is bound to, with the OS-assigned port when port
    /// zero was requested.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Starts the worker pool and the acceptor thread.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the socket cannot be made
    /// non-blocking or a thread cannot be spawned.
    pub fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
        settings: ListenerSettings,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let pool = WorkerPool::spawn(settings.workers, settings.backlog, &handler)?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let address = self.address;
        let handle = thread::Builder::new()
            .name("roster-acceptor".to_owned())
            .spawn(move || run_accept_loop(&self, &shutdown_flag, &pool, settings))
            .map_err(|source| ListenerError::Spawn {
                thread: "roster-acceptor".to_owned(),
                source,
            })?;
        Ok(ListenerHandle {
            address,
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background acceptor thread.
#[derive(Debug)]
pub struct ListenerHandle {
    address: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<(), ListenerError>>>,
}

impl ListenerHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Flag that stops the acceptor once set; shared with signal handlers.
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Asks the acceptor to stop taking connections.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the acceptor to exit and reports why it stopped.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`ListenerError`] that ended the accept loop, or
    /// [`ListenerError::ThreadPanic`] when the thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic)?,
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    pool: &WorkerPool,
    settings: ListenerSettings,
) -> Result<(), ListenerError> {
    info!(
        target: LISTENER_TARGET,
        address = %listener.address,
        workers = settings.workers,
        backlog = settings.backlog,
        "socket listener active"
    );
    let mut next_id = 0_u64;
    while !shutdown.load(Ordering::SeqCst) {
        match listener.listener.accept() {
            Ok((stream, peer)) => {
                next_id += 1;
                let connection = match prepare_stream(stream, settings.io_timeout) {
                    Ok(stream) => Connection::new(next_id, peer, stream),
                    Err(error) => {
                        warn!(
                            target: LISTENER_TARGET,
                            peer = %peer,
                            error = %error,
                            "failed to configure accepted socket"
                        );
                        continue;
                    }
                };
                debug!(
                    target: LISTENER_TARGET,
                    connection = next_id,
                    peer = %peer,
                    "connection accepted"
                );
                if pool.hand_off(connection) == Err(HandOffError::WorkersGone) {
                    error!(target: LISTENER_TARGET, "no workers left; stopping listener");
                    return Err(ListenerError::WorkersGone);
                }
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) if is_transient(error.kind()) => {
                warn!(
                    target: LISTENER_TARGET,
                    error = %error,
                    "transient accept error"
                );
            }
            Err(source) => {
                error!(
                    target: LISTENER_TARGET,
                    error = %source,
                    "socket accept failed; stopping listener"
                );
                return Err(ListenerError::Accept { source });
            }
        }
    }
    info!(target: LISTENER_TARGET, address = %listener.address, "socket listener stopped");
    Ok(())
}

const fn is_transient(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}

fn prepare_stream(stream: TcpStream, timeout: Option<Duration>) -> io::Result<TcpStream> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    Ok(stream)
}
