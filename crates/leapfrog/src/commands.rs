//! Command implementations for the three run modes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use leapfrog_updater::{
    Downloader, GitHubClient, InstalledVersion, Launch, Orchestrator, ProcessLauncher,
    ReleaseIdentity, ReleaseSource, SelfCopy, UpdateCommand, UpdateOutcome,
};

use crate::config::{InstallConfig, RelaunchSettings};
use crate::prompt::{ConsolePrompt, DialogChooser, SystemLinks};

/// Directory holding the running binary and its bundled resources.
fn bundle_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine current executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("current executable has no parent directory")
}

/// Removes the self-copy of a previous run, before any network access.
fn startup_cleanup<S, D, L>(orchestrator: &Orchestrator<S, D, L>) -> Result<SelfCopy>
where
    S: ReleaseSource,
    D: Downloader,
    L: Launch,
{
    let self_copy = SelfCopy::current()?;
    let running = std::env::current_exe().context("cannot determine current executable path")?;
    orchestrator.cleanup(&self_copy, &running);
    Ok(self_copy)
}

/// Launch settings from an `install.toml` next to the binary or in `working_dir`.
fn relaunch_settings(identity: &ReleaseIdentity, working_dir: &Path) -> Result<RelaunchSettings> {
    let bundle = bundle_dir()?;
    let config = InstallConfig::find(&[bundle.as_path(), working_dir])?;
    if config.is_none() {
        tracing::debug!("No install configuration found, using launch defaults");
    }
    Ok(RelaunchSettings::resolve(config.as_ref(), &identity.project))
}

/// First-time install of the bundled archive.
pub fn run_install(install_dir: Option<PathBuf>) -> Result<()> {
    let config = InstallConfig::load(&bundle_dir()?)?;
    tracing::info!(
        "Installing {} from {}",
        config.identity(),
        config.archive.display()
    );

    let launcher = ProcessLauncher::discover(config.launch.runtime_home.as_deref());
    let mut orchestrator = Orchestrator::offline(launcher);

    let installed = orchestrator.install(
        &config.archive,
        &DialogChooser::new(install_dir),
        &config.executable(),
    )?;
    tracing::info!("Installed into {}", installed.display());
    Ok(())
}

/// Updates the installation in the working directory to the latest release.
pub fn run_update(identity: &ReleaseIdentity) -> Result<()> {
    let working_dir = std::env::current_dir().context("cannot determine working directory")?;
    let settings = relaunch_settings(identity, &working_dir)?;
    let client = GitHubClient::new()?;
    let launcher = ProcessLauncher::discover(settings.runtime_home.as_deref());
    let mut orchestrator = Orchestrator::new(&client, &client, launcher);
    startup_cleanup(&orchestrator)?;

    let installed = InstalledVersion::current();
    tracing::info!(
        "Updating {} in {} (installed {})",
        identity,
        working_dir.display(),
        installed
    );

    let outcome = orchestrator.update(
        identity,
        &working_dir,
        installed.as_str(),
        &settings.executable,
    )?;
    match outcome {
        UpdateOutcome::UpToDate => tracing::info!("{} is up to date", identity),
        UpdateOutcome::Relaunched { tag } => tracing::info!("Updated {} to {}", identity, tag),
    }
    Ok(())
}

/// Checks for an update, asks the user, and hands off to a self-copy to apply it.
pub fn run_check(identity: &ReleaseIdentity) -> Result<()> {
    let working_dir = std::env::current_dir().context("cannot determine working directory")?;
    let settings = relaunch_settings(identity, &working_dir)?;
    let client = GitHubClient::new()?;
    let launcher = ProcessLauncher::discover(settings.runtime_home.as_deref());
    let mut orchestrator = Orchestrator::new(&client, &client, launcher);
    let self_copy = startup_cleanup(&orchestrator)?;

    let installed = InstalledVersion::current();
    let Some(notice) = orchestrator.check_for_notice(identity, installed.as_str()) else {
        tracing::info!("{} {} is up to date", identity, installed);
        return Ok(());
    };

    let prompt = ConsolePrompt::new(identity.clone());
    loop {
        let command = prompt.ask(&notice);
        let answered = !matches!(command, UpdateCommand::OpenLink(_));
        let handled =
            orchestrator.handle(command, identity, &self_copy, &working_dir, &SystemLinks);
        if let Err(e) = handled {
            if answered {
                return Err(e.into());
            }
            tracing::warn!("{}", e);
        }
        if answered {
            return Ok(());
        }
    }
}
