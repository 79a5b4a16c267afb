//! Failures that end a `rosterd` run.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Why [`run_daemon`](super::run_daemon) returned early or unsuccessfully.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration, telemetry or the storage root could not be prepared.
    #[error("rosterd could not start: {source}")]
    Bootstrap {
        #[from]
        source: BootstrapError,
    },
    /// The directory listener failed to bind, or its acceptor hit a fatal
    /// error while serving.
    #[error("directory listener failed: {source}")]
    Listener {
        #[from]
        source: ListenerError,
    },
    /// Termination signals could not be routed to the listener.
    #[error("failed to arm shutdown signals: {source}")]
    Shutdown {
        #[from]
        source: ShutdownError,
    },
}
