//! Leapfrog installer and updater.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use leapfrog_cli::cli::{Cli, LogFormatArg, LogLevelArg, Mode};
use leapfrog_cli::commands::{run_check, run_install, run_update};
use leapfrog_cli::logging::{LogConfig, LogFormat, init_logging};
use leapfrog_updater::UpdateError;
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return;
    }

    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("usage: leapfrog [--install-dir <DIR>] | leapfrog [--check] <OWNER> <PROJECT>");
            return;
        }
    };

    let result = match &mode {
        Mode::Install { install_dir } => run_install(install_dir.clone()),
        Mode::Update(identity) => run_update(identity),
        Mode::Check(identity) => run_check(identity),
    };

    // Failures are reported, never turned into an exit code.
    if let Err(error) = result {
        tracing::error!("{:#}", error);
        match error.downcast_ref::<UpdateError>() {
            Some(UpdateError::UserCancelled) => {}
            Some(update_error) => eprintln!("error: {}", update_error.user_message()),
            None => eprintln!("error: {error:#}"),
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
