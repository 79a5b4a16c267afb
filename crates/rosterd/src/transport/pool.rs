//! Bounded worker pool fed by the acceptor.
//!
//! Connections travel through a `sync_channel` of `backlog` slots. Sending
//! moves the [`Connection`] out of the acceptor, so no later `accept` can
//! touch a value a worker is using. When every slot is taken the new
//! connection is closed straight away rather than queued.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, error, warn};

use super::{Connection, ConnectionHandler, LISTENER_TARGET, ListenerError};

/// Outcome of a rejected hand-off.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HandOffError {
    /// All workers are busy and the backlog is full; the connection was closed.
    Saturated,
    /// No worker is left to receive connections; the connection was closed.
    WorkersGone,
}

type SharedReceiver = Arc<Mutex<Receiver<Connection>>>;

/// Sending side of the worker pool. Dropping it lets idle workers exit once
/// the queue drains.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    sender: SyncSender<Connection>,
}

impl WorkerPool {
    /// Starts `workers` detached threads sharing a queue of `backlog` slots.
    pub(crate) fn spawn(
        workers: usize,
        backlog: usize,
        handler: &Arc<dyn ConnectionHandler>,
    ) -> Result<Self, ListenerError> {
        let (sender, receiver) = mpsc::sync_channel(backlog);
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
        for index in 0..workers {
            let name = format!("roster-worker-{index}");
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(handler);
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || run_worker(&receiver, handler.as_ref()))
                .map_err(|source| ListenerError::Spawn {
                    thread: name,
                    source,
                })?;
        }
        Ok(Self { sender })
    }

    /// Moves `connection` to a worker without blocking.
    pub(crate) fn hand_off(&self, connection: Connection) -> Result<(), HandOffError> {
        match self.sender.try_send(connection) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(rejected)) => {
                warn!(
                    target: LISTENER_TARGET,
                    connection = rejected.id(),
                    peer = %rejected.peer(),
                    "worker pool saturated; closing connection"
                );
                rejected.close();
                Err(HandOffError::Saturated)
            }
            Err(TrySendError::Disconnected(rejected)) => {
                rejected.close();
                Err(HandOffError::WorkersGone)
            }
        }
    }
}

fn run_worker(receiver: &SharedReceiver, handler: &dyn ConnectionHandler) {
    loop {
        let next = match receiver.lock() {
            Ok(queue) => queue.recv(),
            Err(_) => {
                error!(target: LISTENER_TARGET, "hand-off queue lock poisoned; worker exiting");
                return;
            }
        };
        let Ok(connection) = next else {
            debug!(target: LISTENER_TARGET, "hand-off queue closed; worker exiting");
            return;
        };
        serve(handler, connection);
    }
}

fn serve(handler: &dyn ConnectionHandler, connection: Connection) {
    let id = connection.id();
    if panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&connection))).is_err() {
        error!(
            target: LISTENER_TARGET,
            connection = id,
            "connection handler panicked"
        );
    }
    connection.close();
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::{TcpListener, TcpStream};
    use std::sync::Barrier;
    use std::time::Duration;

    use super::*;

    struct BlockingHandler {
        entered: Arc<Barrier>,
        release: Arc<Barrier>,
    }

    impl ConnectionHandler for BlockingHandler {
        fn handle(&self, _connection: &Connection) {
            self.entered.wait();
            self.release.wait();
        }
    }

    fn connection_pair(listener: &TcpListener, id: u64) -> (Connection, TcpStream) {
        let client = TcpStream::connect(listener.local_addr().expect("addr")).expect("connect");
        let (stream, peer) = listener.accept().expect("accept");
        (Connection::new(id, peer, stream), client)
    }

    #[test]
    fn saturated_pool_closes_the_extra_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let handler: Arc<dyn ConnectionHandler> = Arc::new(BlockingHandler {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        });
        let pool = WorkerPool::spawn(1, 1, &handler).expect("spawn pool");

        let (busy, _busy_client) = connection_pair(&listener, 1);
        pool.hand_off(busy).expect("first hand-off");
        entered.wait();

        let (queued, _queued_client) = connection_pair(&listener, 2);
        pool.hand_off(queued).expect("second hand-off fills the backlog");

        let (extra, mut extra_client) = connection_pair(&listener, 3);
        assert_eq!(pool.hand_off(extra), Err(HandOffError::Saturated));

        extra_client
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("timeout");
        let mut buffer = [0_u8; 1];
        let read = extra_client.read(&mut buffer).expect("rejected socket reads EOF");
        assert_eq!(read, 0);

        release.wait();
        entered.wait();
        release.wait();
    }
}
