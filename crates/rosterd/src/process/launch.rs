//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::HealthReporter;
use crate::transport::{ListenerSettings, SocketListener};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Process-level collaborators needed to control daemon lifecycle.
pub(crate) struct ProcessControl<S> {
    pub(crate) shutdown: S,
}

/// Service dependencies required to construct the daemon runtime.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) process: ProcessControl<S>,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the daemon using the production collaborators.
///
/// Blocks until a termination signal arrives or the listener hits a fatal
/// error.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap, binding or signal installation
/// fails, or when the listener stops because of a fatal error.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            shutdown: SystemShutdownSignal::new(),
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl { shutdown } = process;
    let ServiceDeps { loader, reporter } = services;

    info!(target: PROCESS_TARGET, "starting daemon runtime");
    let daemon = bootstrap_with(&loader, reporter.as_ref())?;
    let (config, directory) = daemon.into_parts();
    let listener = SocketListener::bind(config.host(), config.port())?;
    let handler = Arc::new(DispatchConnectionHandler::new(directory));
    let handle = listener.start(handler, ListenerSettings::from_config(&config))?;
    reporter.listener_ready(handle.local_addr());

    if let Err(error) = shutdown.arm(handle.shutdown_flag()) {
        handle.shutdown();
        let outcome = handle.join();
        reporter.listener_stopped(outcome.as_ref().err());
        return Err(error.into());
    }

    let outcome = handle.join();
    reporter.listener_stopped(outcome.as_ref().err());
    outcome?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
