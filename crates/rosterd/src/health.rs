//! Lifecycle milestones of `rosterd`, from bootstrap to listener shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use roster_config::Config;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Receives each lifecycle milestone as the launcher reaches it.
pub trait HealthReporter: Send + Sync {
    /// Called before the configuration is loaded.
    fn bootstrap_starting(&self);

    /// Called once the storage root is open.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Called with the stage that stopped bootstrap.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the listener accepts connections.
    fn listener_ready(&self, address: SocketAddr);

    /// Invoked when the listener stops, with the fatal error if there was one.
    fn listener_stopped(&self, error: Option<&ListenerError>);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, address: SocketAddr) {
        (**self).listener_ready(address);
    }

    fn listener_stopped(&self, error: Option<&ListenerError>) {
        (**self).listener_stopped(error);
    }
}

/// Emits each milestone as a `tracing` event under `rosterd::health`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Creates the reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "bootstrapping directory daemon"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            host = config.host(),
            port = config.port(),
            storage_root = %config.storage_root(),
            workers = config.workers(),
            backlog = config.backlog(),
            delete_policy = %config.delete_policy(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "directory daemon ready to bind"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "directory daemon failed to bootstrap"
        );
    }

    fn listener_ready(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            address = %address,
            "accepting connections"
        );
    }

    fn listener_stopped(&self, error: Option<&ListenerError>) {
        match error {
            None => tracing::info!(
                target: HEALTH_TARGET,
                event = "listener_stopped",
                "listener stopped"
            ),
            Some(error) => tracing::error!(
                target: HEALTH_TARGET,
                event = "listener_failed",
                error = %error,
                "listener stopped after a fatal error"
            ),
        }
    }
}
