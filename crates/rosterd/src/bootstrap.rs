//! Turns a configuration source into a ready-to-serve [`Daemon`].

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use roster_config::{Config, ConfigError};

use crate::dispatch::Directory;
use crate::health::HealthReporter;
use crate::sessions::SessionRegistry;
use crate::store::{StoreError, UserStore};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Source of the daemon configuration.
pub trait ConfigLoader: Send + Sync {
    /// Resolves the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no configuration can be assembled.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Stage at which bootstrap stopped.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds unusable values.
    #[error("invalid configuration: {source}")]
    Validation {
        /// Rule the configuration breaks.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The storage root could not be prepared.
    #[error("failed to prepare storage: {source}")]
    Storage {
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
}

/// Configuration and served state produced by bootstrap.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    directory: Directory,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Validated configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// User store and session registry the daemon serves.
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Handle proving telemetry is installed.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Splits the daemon into its configuration and served state.
    #[must_use]
    pub fn into_parts(self) -> (Config, Directory) {
        (self.config, self.directory)
    }
}

/// Prepares a [`Daemon`] from `loader`.
///
/// The storage root is created when missing. Every failure reaches
/// `reporter` before it is returned.
///
/// # Errors
///
/// Returns a [`BootstrapError`] naming the stage that failed.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match assemble(loader) {
        Ok(daemon) => {
            reporter.bootstrap_succeeded(&daemon.config);
            Ok(daemon)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn assemble(loader: &dyn ConfigLoader) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::Validation { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let store = UserStore::open(config.storage_root().to_owned(), config.delete_policy())
        .map_err(|source| BootstrapError::Storage { source })?;
    Ok(Daemon {
        directory: Directory::new(store, SessionRegistry::new()),
        config,
        telemetry,
    })
}
