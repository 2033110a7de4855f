//! Bundled install configuration (`install.toml`).
//!
//! The installer ships next to its archive and a small TOML file naming the
//! repository the installed application updates from:
//!
//! ```toml
//! owner = "octo"
//! project = "widget"
//! archive = "widget-bundle.zip"
//!
//! [launch]
//! executable = "widget.jar"
//! runtime_home = "/opt/runtime"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use leapfrog_updater::{ReleaseIdentity, UpdateError};
use serde::Deserialize;

/// File name of the bundled configuration.
pub const CONFIG_FILE: &str = "install.toml";

/// Parameters for a first-time install.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallConfig {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub project: String,
    /// Archive file name, relative to the configuration directory.
    pub archive: PathBuf,
    /// How the installed application is started.
    #[serde(default)]
    pub launch: LaunchConfig,
}

/// `[launch]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchConfig {
    /// Application archive started on the runtime; defaults to `<project>.jar`.
    pub executable: Option<String>,
    /// Runtime home; defaults to `JAVA_HOME`.
    pub runtime_home: Option<PathBuf>,
}

impl InstallConfig {
    /// Parses configuration text.
    pub fn parse(text: &str) -> Result<Self, UpdateError> {
        let config: Self =
            toml::from_str(text).map_err(|e| UpdateError::Config(e.message().to_string()))?;
        if config.owner.trim().is_empty() || config.project.trim().is_empty() {
            return Err(UpdateError::Config(
                "owner and project must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Reads `install.toml` from `dir`, resolving the archive path against it.
    pub fn load(dir: &Path) -> Result<Self, UpdateError> {
        let path = dir.join(CONFIG_FILE);
        let text = fs::read_to_string(&path)
            .map_err(|e| UpdateError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::parse(&text).map_err(|e| match e {
            UpdateError::Config(message) => {
                UpdateError::Config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;
        config.archive = dir.join(&config.archive);
        tracing::debug!("Loaded install configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `install.toml` from the first of `dirs` that has one.
    ///
    /// `Ok(None)` when none of them does; a present but invalid file is an error.
    pub fn find(dirs: &[&Path]) -> Result<Option<Self>, UpdateError> {
        match dirs.iter().find(|dir| dir.join(CONFIG_FILE).is_file()) {
            Some(dir) => Self::load(dir).map(Some),
            None => Ok(None),
        }
    }

    /// Repository the installed application updates from.
    #[must_use]
    pub fn identity(&self) -> ReleaseIdentity {
        ReleaseIdentity::new(self.owner.as_str(), self.project.as_str())
    }

    /// Application archive to start after installing.
    #[must_use]
    pub fn executable(&self) -> String {
        default_executable(&self.project, self.launch.executable.as_deref())
    }
}

/// `<project>.jar` unless configured otherwise.
#[must_use]
pub fn default_executable(project: &str, configured: Option<&str>) -> String {
    match configured {
        Some(executable) if !executable.is_empty() => executable.to_string(),
        _ => format!("{project}.jar"),
    }
}

/// How to relaunch `project` after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaunchSettings {
    /// Configured runtime home; `JAVA_HOME` is consulted when absent.
    pub runtime_home: Option<PathBuf>,
    /// Application archive started on the runtime.
    pub executable: String,
}

impl RelaunchSettings {
    /// Takes the `[launch]` table of `config` when there is one.
    #[must_use]
    pub fn resolve(config: Option<&InstallConfig>, project: &str) -> Self {
        let launch = config.map(|c| &c.launch);
        Self {
            runtime_home: launch.and_then(|l| l.runtime_home.clone()),
            executable: default_executable(
                project,
                launch.and_then(|l| l.executable.as_deref()),
            ),
        }
    }
}
