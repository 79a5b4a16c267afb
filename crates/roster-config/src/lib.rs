//! Shared configuration for the roster daemon.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! named by `--config-path` or `ROSTER_CONFIG_PATH`, then `ROSTER_*`
//! environment variables, then command-line flags. Every field is optional in
//! the merged structure; the accessors apply the defaults from [`defaults`].

mod defaults;
mod logging;
mod policy;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_BACKLOG, DEFAULT_HOST, DEFAULT_IO_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_PORT,
    DEFAULT_STORAGE_ROOT, DEFAULT_WORKERS, default_delete_policy, default_log_filter,
    default_log_format, default_storage_root,
};
pub use logging::LogFormat;
pub use policy::DeletePolicy;

/// Daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ROSTER")]
pub struct Config {
    /// Address the listener binds to.
    pub host: Option<String>,
    /// TCP port the listener binds to. Zero asks the OS for a free port.
    pub port: Option<u16>,
    /// Directory holding one subdirectory per registered user.
    pub storage_root: Option<Utf8PathBuf>,
    /// Number of worker threads serving connections.
    pub workers: Option<usize>,
    /// Accepted connections allowed to wait for a free worker.
    pub backlog: Option<usize>,
    /// Per-connection read and write timeout in milliseconds; zero disables.
    pub io_timeout_ms: Option<u64>,
    /// Behaviour of `UNREGISTER` when a content file cannot be removed.
    pub delete_policy: Option<DeletePolicy>,
    /// Tracing filter expression, for example `info` or `rosterd=debug`.
    pub log_filter: Option<String>,
    /// Output format for log records.
    pub log_format: Option<LogFormat>,
}

/// Values that load successfully but cannot run a daemon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `workers` was set to zero.
    #[error("workers must be at least 1")]
    NoWorkers,
    /// `backlog` was set to zero.
    #[error("backlog must be at least 1")]
    NoBacklog,
    /// `storage_root` was set to an empty path.
    #[error("storage root must not be empty")]
    EmptyStorageRoot,
}

impl Config {
    /// Address the listener binds to.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port the listener binds to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Directory holding the user directories.
    #[must_use]
    pub fn storage_root(&self) -> &Utf8Path {
        self.storage_root
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(DEFAULT_STORAGE_ROOT))
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS)
    }

    /// Capacity of the hand-off queue between acceptor and workers.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.backlog.unwrap_or(DEFAULT_BACKLOG)
    }

    /// Per-connection I/O timeout, or `None` when timeouts are disabled.
    #[must_use]
    pub fn io_timeout(&self) -> Option<Duration> {
        match self.io_timeout_ms.unwrap_or(DEFAULT_IO_TIMEOUT_MS) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Deletion policy applied by `UNREGISTER`.
    #[must_use]
    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy.unwrap_or_else(default_delete_policy)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Output format for log records.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Rejects values that load but cannot drive a daemon.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers() == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.backlog() == 0 {
            return Err(ConfigError::NoBacklog);
        }
        if self.storage_root().as_str().is_empty() {
            return Err(ConfigError::EmptyStorageRoot);
        }
        Ok(())
    }
}
