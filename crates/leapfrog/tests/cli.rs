//! Integration tests for argument handling.

use std::path::PathBuf;

use clap::Parser;

use leapfrog_cli::cli::{Cli, Mode, UsageError};
use leapfrog_updater::ReleaseIdentity;

fn mode(args: &[&str]) -> Result<Mode, UsageError> {
    let cli = Cli::try_parse_from(std::iter::once("leapfrog").chain(args.iter().copied()))
        .unwrap();
    cli.mode()
}

#[test]
fn test_no_arguments_is_install() {
    assert_eq!(mode(&[]), Ok(Mode::Install { install_dir: None }));
}

#[test]
fn test_install_dir_bypasses_chooser() {
    assert_eq!(
        mode(&["--install-dir", "/opt/widget"]),
        Ok(Mode::Install {
            install_dir: Some(PathBuf::from("/opt/widget"))
        })
    );
}

#[test]
fn test_two_arguments_is_update() {
    assert_eq!(
        mode(&["octo", "widget"]),
        Ok(Mode::Update(ReleaseIdentity::new("octo", "widget")))
    );
}

#[test]
fn test_check_flag_selects_check_mode() {
    assert_eq!(
        mode(&["--check", "octo", "widget"]),
        Ok(Mode::Check(ReleaseIdentity::new("octo", "widget")))
    );
}

#[test]
fn test_other_argument_counts_are_usage_errors() {
    assert_eq!(mode(&["octo"]), Err(UsageError::ArgumentCount(1)));
    assert_eq!(
        mode(&["octo", "widget", "extra"]),
        Err(UsageError::ArgumentCount(3))
    );
}

#[test]
fn test_flag_combinations_are_usage_errors() {
    assert_eq!(mode(&["--check"]), Err(UsageError::CheckWithoutIdentity));
    assert_eq!(
        mode(&["--install-dir", "/opt/widget", "octo", "widget"]),
        Err(UsageError::InstallDirWithIdentity)
    );
}

#[test]
fn test_logging_flags_parse() {
    let cli = Cli::try_parse_from([
        "leapfrog",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--log-file",
        "leapfrog.log",
        "octo",
        "widget",
    ])
    .unwrap();
    assert!(cli.log_level.is_some());
    assert_eq!(cli.log_file, Some(PathBuf::from("leapfrog.log")));
    assert!(cli.mode().is_ok());
}
