//! Integration tests for the bundled install configuration.

use std::fs;
use std::path::PathBuf;

use leapfrog_cli::config::{CONFIG_FILE, InstallConfig, RelaunchSettings};
use leapfrog_updater::{ReleaseIdentity, UpdateError};

#[test]
fn test_minimal_config() {
    let config = InstallConfig::parse(
        r#"
        owner = "octo"
        project = "widget"
        archive = "widget-bundle.zip"
        "#,
    )
    .unwrap();

    assert_eq!(config.identity(), ReleaseIdentity::new("octo", "widget"));
    assert_eq!(config.archive, PathBuf::from("widget-bundle.zip"));
    assert_eq!(config.executable(), "widget.jar");
    assert_eq!(config.launch.runtime_home, None);
}

#[test]
fn test_launch_table() {
    let config = InstallConfig::parse(
        r#"
        owner = "octo"
        project = "widget"
        archive = "widget-bundle.zip"

        [launch]
        executable = "widget-app.jar"
        runtime_home = "/opt/runtime"
        "#,
    )
    .unwrap();

    assert_eq!(config.executable(), "widget-app.jar");
    assert_eq!(config.launch.runtime_home, Some(PathBuf::from("/opt/runtime")));
}

#[test]
fn test_missing_field_is_config_error() {
    let result = InstallConfig::parse(r#"owner = "octo""#);
    assert!(matches!(result, Err(UpdateError::Config(_))));
}

#[test]
fn test_empty_identity_is_config_error() {
    let result = InstallConfig::parse(
        r#"
        owner = ""
        project = "widget"
        archive = "widget-bundle.zip"
        "#,
    );
    assert!(matches!(result, Err(UpdateError::Config(_))));
}

#[test]
fn test_load_resolves_archive_next_to_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE),
        "owner = \"octo\"\nproject = \"widget\"\narchive = \"widget-bundle.zip\"\n",
    )
    .unwrap();

    let config = InstallConfig::load(dir.path()).unwrap();

    assert_eq!(config.archive, dir.path().join("widget-bundle.zip"));
}

#[test]
fn test_load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = InstallConfig::load(dir.path());
    match result {
        Err(UpdateError::Config(message)) => assert!(message.contains(CONFIG_FILE)),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_relaunch_settings_follow_launch_table() {
    let bundle = tempfile::tempdir().unwrap();
    let working = tempfile::tempdir().unwrap();
    fs::write(
        bundle.path().join(CONFIG_FILE),
        "owner = \"octo\"\nproject = \"widget\"\narchive = \"widget-bundle.zip\"\n\n\
         [launch]\nexecutable = \"widget-app.jar\"\nruntime_home = \"/opt/rt\"\n",
    )
    .unwrap();

    let config = InstallConfig::find(&[bundle.path(), working.path()]).unwrap();
    let settings = RelaunchSettings::resolve(config.as_ref(), "widget");

    assert_eq!(settings.executable, "widget-app.jar");
    assert_eq!(settings.runtime_home, Some(PathBuf::from("/opt/rt")));
}

#[test]
fn test_relaunch_settings_found_in_working_dir() {
    let bundle = tempfile::tempdir().unwrap();
    let working = tempfile::tempdir().unwrap();
    fs::write(
        working.path().join(CONFIG_FILE),
        "owner = \"octo\"\nproject = \"widget\"\narchive = \"widget-bundle.zip\"\n\n\
         [launch]\nexecutable = \"widget-app.jar\"\n",
    )
    .unwrap();

    let config = InstallConfig::find(&[bundle.path(), working.path()]).unwrap();
    let settings = RelaunchSettings::resolve(config.as_ref(), "widget");

    assert_eq!(settings.executable, "widget-app.jar");
    assert_eq!(settings.runtime_home, None);
}

#[test]
fn test_relaunch_settings_default_without_config() {
    let bundle = tempfile::tempdir().unwrap();
    let working = tempfile::tempdir().unwrap();

    let config = InstallConfig::find(&[bundle.path(), working.path()]).unwrap();
    assert!(config.is_none());

    let settings = RelaunchSettings::resolve(config.as_ref(), "widget");
    assert_eq!(settings.executable, "widget.jar");
    assert_eq!(settings.runtime_home, None);
}

#[test]
fn test_invalid_config_is_not_silently_ignored() {
    let bundle = tempfile::tempdir().unwrap();
    fs::write(bundle.path().join(CONFIG_FILE), "owner = \"octo\"\n").unwrap();

    let result = InstallConfig::find(&[bundle.path()]);
    assert!(matches!(result, Err(UpdateError::Config(_))));
}
