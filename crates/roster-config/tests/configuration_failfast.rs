use std::ffi::OsString;
use std::fs;

use roster_config::{Config, ConfigError};
use ortho_config::OrthoConfig;
use tempfile::TempDir;

#[test]
fn malformed_config_file_fails_to_load() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("roster.toml");
    fs::write(&path, "port = \"not a number\"\n").expect("write malformed config");

    let args = vec![
        OsString::from("rosterd"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    assert!(
        !error.to_string().is_empty(),
        "expected a descriptive load error"
    );
}

#[test]
fn unknown_delete_policy_is_rejected() {
    let args = [
        OsString::from("rosterd"),
        OsString::from("--delete-policy"),
        OsString::from("eventually"),
    ];
    assert!(Config::load_from_iter(args).is_err());
}

#[test]
fn zero_workers_load_but_fail_validation() {
    let args = [
        OsString::from("rosterd"),
        OsString::from("--workers"),
        OsString::from("0"),
    ];
    let config = Config::load_from_iter(args).expect("flags parse");
    assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
}
