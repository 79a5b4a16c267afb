//! Shared fixtures for the daemon test suites.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use roster_config::{Config, DeletePolicy};
use roster_wire::Client;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::dispatch::{Directory, DispatchConnectionHandler};
use crate::health::HealthReporter;
use crate::sessions::SessionRegistry;
use crate::store::UserStore;
use crate::transport::{ListenerError, ListenerHandle, ListenerSettings, SocketListener};

pub(crate) const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerReady(SocketAddr),
    ListenerStopped(Option<String>),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    /// Polls until the listener reports its address.
    pub(crate) fn wait_for_listener(&self) -> Option<SocketAddr> {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while Instant::now() < deadline {
            let ready = self.events().into_iter().find_map(|event| match event {
                HealthEvent::ListenerReady(address) => Some(address),
                _ => None,
            });
            if ready.is_some() {
                return ready;
            }
            thread::sleep(POLL_INTERVAL);
        }
        None
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, address: SocketAddr) {
        self.record(HealthEvent::ListenerReady(address));
    }

    fn listener_stopped(&self, error: Option<&ListenerError>) {
        self.record(HealthEvent::ListenerStopped(
            error.map(ToString::to_string),
        ));
    }
}

/// Loader that binds to an ephemeral loopback port and stores users under a
/// temporary directory.
pub(crate) struct TestConfigLoader {
    dir: TempDir,
    workers: usize,
}

impl TestConfigLoader {
    pub(crate) fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temporary storage directory"),
            workers: 2,
        }
    }

    /// Loader whose configuration fails validation.
    pub(crate) fn without_workers() -> Self {
        Self {
            workers: 0,
            ..Self::new()
        }
    }

    pub(crate) fn storage_root(&self) -> Utf8PathBuf {
        Utf8Path::from_path(self.dir.path())
            .expect("temporary directory path was not valid UTF-8")
            .join("storage")
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            host: Some("127.0.0.1".to_owned()),
            port: Some(0),
            storage_root: Some(self.storage_root()),
            workers: Some(self.workers),
            backlog: Some(8),
            io_timeout_ms: Some(5_000),
            log_filter: Some("warn".to_owned()),
            ..Config::default()
        })
    }
}

/// Loader that fails by passing an unparseable CLI argument.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            OsString::from("rosterd"),
            OsString::from("--port"),
            OsString::from("not-a-port"),
        ])
    }
}

/// A listener serving a temporary storage root on an ephemeral port.
pub(crate) struct RunningServer {
    dir: TempDir,
    handle: Option<ListenerHandle>,
    client: Client,
}

impl RunningServer {
    pub(crate) fn start(workers: usize, backlog: usize) -> Self {
        let dir = TempDir::new().expect("failed to create temporary storage directory");
        let root = Utf8Path::from_path(dir.path())
            .expect("temporary directory path was not valid UTF-8")
            .join("storage");
        let store = UserStore::open(root, DeletePolicy::FailFast).expect("open user store");
        let handler = Arc::new(DispatchConnectionHandler::new(Directory::new(
            store,
            SessionRegistry::new(),
        )));
        let listener = SocketListener::bind("127.0.0.1", 0).expect("bind listener");
        let settings = ListenerSettings {
            workers,
            backlog,
            io_timeout: Some(WAIT_TIMEOUT),
        };
        let handle = listener.start(handler, settings).expect("start listener");
        let client = Client::new(handle.local_addr()).with_timeout(WAIT_TIMEOUT);
        Self {
            dir,
            handle: Some(handle),
            client,
        }
    }

    pub(crate) fn client(&self) -> Client {
        self.client.clone()
    }

    pub(crate) fn user_dir(&self, user: &str) -> std::path::PathBuf {
        self.dir.path().join("storage").join(user)
    }

    pub(crate) fn stop(&mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => {
                handle.shutdown();
                handle.join()
            }
            None => Ok(()),
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
