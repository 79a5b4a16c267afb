//! Unit tests for bootstrap and launch wiring.

use std::io;
use std::sync::Arc;

use roster_config::{Config, LogFormat};

use crate::bootstrap::{ConfigLoader, StaticConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::process::launch::{LaunchPlan, ProcessControl, ServiceDeps, run_daemon_with};
use crate::process::shutdown::MockShutdownSignal;
use crate::process::{LaunchError, ShutdownError};
use crate::telemetry;

use super::support::{FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader};

fn plan<L: ConfigLoader>(
    loader: L,
    shutdown: MockShutdownSignal,
    reporter: &Arc<RecordingHealthReporter>,
) -> LaunchPlan<L, MockShutdownSignal> {
    let reporter: Arc<dyn HealthReporter> = Arc::clone(reporter) as _;
    LaunchPlan {
        process: ProcessControl { shutdown },
        services: ServiceDeps { loader, reporter },
    }
}

#[test]
fn telemetry_initialisation_is_idempotent() {
    let first = telemetry::initialise(&Config::default()).expect("first initialisation");
    let compact = Config {
        log_format: Some(LogFormat::Compact),
        ..Config::default()
    };
    let second = telemetry::initialise(&compact).expect("second initialisation");
    assert_eq!(second, first);
    assert_eq!(second.format(), LogFormat::Json);
}

#[test]
fn static_loader_returns_its_configuration() {
    let config = Config {
        port: Some(7443),
        ..Config::default()
    };
    let loader = StaticConfigLoader::new(config.clone());
    assert_eq!(loader.load().expect("static load"), config);
}

#[test]
fn bootstrap_reports_each_stage() {
    let reporter = RecordingHealthReporter::default();
    let loader = TestConfigLoader::new();
    let daemon = bootstrap_with(&loader, &reporter).expect("bootstrap");
    assert!(loader.storage_root().is_dir());
    assert_eq!(daemon.config().workers(), 2);
    assert_eq!(
        reporter.events(),
        [HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
}

#[test]
fn launch_stops_before_binding_when_bootstrap_fails() {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let mut shutdown = MockShutdownSignal::new();
    shutdown.expect_arm().never();

    let outcome = run_daemon_with(plan(FailingConfigLoader, shutdown, &reporter));

    assert!(matches!(outcome, Err(LaunchError::Bootstrap { .. })));
    assert!(
        !reporter
            .events()
            .iter()
            .any(|event| matches!(event, HealthEvent::ListenerReady(_)))
    );
}

#[test]
fn launch_stops_the_listener_when_signals_cannot_be_armed() {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let mut shutdown = MockShutdownSignal::new();
    shutdown.expect_arm().times(1).returning(|_| {
        Err(ShutdownError::Install {
            source: io::Error::other("signal handlers unavailable"),
        })
    });

    let outcome = run_daemon_with(plan(TestConfigLoader::new(), shutdown, &reporter));

    assert!(matches!(outcome, Err(LaunchError::Shutdown { .. })));
    let events = reporter.events();
    assert!(
        events
            .iter()
            .any(|event| matches!(event, HealthEvent::ListenerReady(_)))
    );
    assert_eq!(events.last(), Some(&HealthEvent::ListenerStopped(None)));
}
