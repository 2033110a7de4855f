//! CLI argument definitions for the leapfrog installer and updater.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use leapfrog_updater::ReleaseIdentity;
use thiserror::Error;

#[derive(Parser)]
#[command(
    name = "leapfrog",
    version,
    about = "Install or update an application from its GitHub releases",
    long_about = "Install or update an application from its GitHub releases.\n\n\
                  Without arguments, installs the bundled archive described by install.toml.\n\
                  With <OWNER> <PROJECT>, updates the installation in the current directory\n\
                  to the latest release of that repository."
)]
pub struct Cli {
    /// Repository owner and project name (update mode).
    #[arg(value_name = "OWNER PROJECT", num_args = 0..)]
    pub args: Vec<String>,

    /// Check for an update and ask before applying it.
    #[arg(long = "check")]
    pub check: bool,

    /// Install into this directory instead of asking (install mode).
    #[arg(long = "install-dir", value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// What this invocation does, decided from the positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// First-time install of the bundled archive.
    Install {
        /// Directory given on the command line, bypassing the chooser.
        install_dir: Option<PathBuf>,
    },
    /// Update the installation in the working directory.
    Update(ReleaseIdentity),
    /// Check, ask, and restart from a self-copy to update.
    Check(ReleaseIdentity),
}

/// Invalid argument combination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("expected no arguments or <OWNER> <PROJECT>, got {0} argument(s)")]
    ArgumentCount(usize),

    #[error("--check requires <OWNER> <PROJECT>")]
    CheckWithoutIdentity,

    #[error("--install-dir only applies to a first-time install")]
    InstallDirWithIdentity,
}

impl Cli {
    /// Resolves the run mode; any argument count other than zero or two is an error.
    pub fn mode(&self) -> Result<Mode, UsageError> {
        match self.args.as_slice() {
            [] if self.check => Err(UsageError::CheckWithoutIdentity),
            [] => Ok(Mode::Install {
                install_dir: self.install_dir.clone(),
            }),
            [_, _] if self.install_dir.is_some() => Err(UsageError::InstallDirWithIdentity),
            [owner, project] => {
                let identity = ReleaseIdentity::new(owner.as_str(), project.as_str());
                Ok(if self.check {
                    Mode::Check(identity)
                } else {
                    Mode::Update(identity)
                })
            }
            other => Err(UsageError::ArgumentCount(other.len())),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
