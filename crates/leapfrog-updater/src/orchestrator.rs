//! The update state machine.
//!
//! Two flows share one orchestrator:
//!
//! - **Update**: `Idle -> Checking -> UpdateAvailable -> Downloading ->
//!   Extracting -> Relaunching -> Terminated`, or `Checking -> UpToDate` when
//!   the release is the installed one or carries no archive.
//! - **First install**: `Idle -> AwaitingUserDirectoryChoice ->
//!   StagingTempCopy -> Extracting -> Relaunching -> Terminated`.
//!
//! Release metadata is never stored on the orchestrator. [`Orchestrator::check`]
//! returns it and callers pass it back in, so no query can run before a fetch.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::changelog;
use crate::error::{Result, UpdateError};
use crate::extract::extract;
use crate::handoff::SelfCopy;
use crate::launch::Launch;
use crate::release::{ReleaseDescriptor, ReleaseIdentity};
use crate::resolve::{ResolvedAsset, resolve_download_asset};
use crate::source::{Downloader, ReleaseSource};
use crate::version;

/// Name of the staging directory under the install root.
pub const STAGING_DIR: &str = "updates";

/// Prefix of the temporary directory the bundled archive is staged in.
const INSTALL_TEMP_PREFIX: &str = "Install";

/// Where the orchestrator is in either flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateState {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// Fetching the latest release.
    Checking,
    /// Nothing actionable: same version, no metadata, or no archive asset.
    UpToDate,
    /// A newer release with a usable archive exists.
    UpdateAvailable,
    /// Streaming the archive into the staging directory.
    Downloading,
    /// Waiting for the user to pick an install directory.
    AwaitingUserDirectoryChoice,
    /// Copying the bundled archive to a temporary directory.
    StagingTempCopy,
    /// Merging the archive into its destination.
    Extracting,
    /// Starting the installed application.
    Relaunching,
    /// Control has been handed to another process.
    Terminated,
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Checking => "Checking",
            Self::UpToDate => "UpToDate",
            Self::UpdateAvailable => "UpdateAvailable",
            Self::Downloading => "Downloading",
            Self::AwaitingUserDirectoryChoice => "AwaitingUserDirectoryChoice",
            Self::StagingTempCopy => "StagingTempCopy",
            Self::Extracting => "Extracting",
            Self::Relaunching => "Relaunching",
            Self::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}

/// Result of an update run that returned control to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No update was applied.
    UpToDate,
    /// The archive was installed and the application started.
    Relaunched {
        /// Tag of the installed release.
        tag: String,
    },
}

/// What the presentation layer shows when an update is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeNotice {
    /// Release title, or tag when untitled.
    pub update_name: String,
    /// Rendered notes of every release newer than the installed one.
    pub changelog_html: String,
}

/// The user's answer to an [`UpgradeNotice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCommand {
    /// Restart the updater from a copy and apply the update.
    Update,
    /// Open a link from the release notes.
    OpenLink(String),
    /// Do nothing.
    Dismiss,
}

/// Asks the user where to install.
pub trait DirectoryChooser {
    /// Returns the chosen directory, or `None` when the user dismissed the prompt.
    fn choose_directory(&self) -> Option<PathBuf>;
}

/// Opens links in the user's browser.
pub trait LinkOpener {
    /// Opens `url`.
    fn open_link(&self, url: &str) -> Result<()>;
}

/// Drives the update and install flows over injected collaborators.
#[derive(Debug)]
pub struct Orchestrator<S, D, L> {
    source: S,
    downloader: D,
    launcher: L,
    state: UpdateState,
    /// Parent of the install staging directory; the system temp dir when unset.
    scratch_root: Option<PathBuf>,
}

impl<S, D, L> Orchestrator<S, D, L> {
    /// Current state.
    #[must_use]
    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Stages the bundled archive under `root` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn transition(&mut self, next: UpdateState) {
        tracing::info!("{} -> {}", self.state, next);
        self.state = next;
    }
}

impl<L: Launch> Orchestrator<(), (), L> {
    /// Creates an idle orchestrator for the first-install flow, which never
    /// touches the network.
    pub fn offline(launcher: L) -> Self {
        Self {
            source: (),
            downloader: (),
            launcher,
            state: UpdateState::Idle,
            scratch_root: None,
        }
    }
}

impl<S, D, L> Orchestrator<S, D, L>
where
    S: ReleaseSource,
    D: Downloader,
    L: Launch,
{
    /// Creates an idle orchestrator.
    pub fn new(source: S, downloader: D, launcher: L) -> Self {
        Self {
            source,
            downloader,
            launcher,
            state: UpdateState::Idle,
            scratch_root: None,
        }
    }

    /// Removes a self-copy left by a previous run.
    ///
    /// Must run before anything else touches the network. Failures are logged
    /// and never stop the run.
    pub fn cleanup(&self, self_copy: &SelfCopy, running: &Path) {
        if let Err(e) = self_copy.cleanup_stale(running) {
            tracing::warn!("Startup cleanup failed: {}", e);
        }
    }

    /// Fetches the latest release.
    ///
    /// Transport and parse failures are logged and yield `None`; every later
    /// decision treats `None` as "nothing to do".
    pub fn check(&mut self, identity: &ReleaseIdentity) -> Option<ReleaseDescriptor> {
        self.transition(UpdateState::Checking);
        match self.source.latest_release(identity) {
            Ok(release) => {
                tracing::info!("Latest release of {} is {:?}", identity, release.tag);
                Some(release)
            }
            Err(e) => {
                tracing::warn!("Could not fetch release information for {}: {}", identity, e);
                None
            }
        }
    }

    /// Whether `release` differs from the installed version. Has no side effects.
    #[must_use]
    pub fn update_available(installed: &str, release: Option<&ReleaseDescriptor>) -> bool {
        release.is_some_and(|r| version::update_available(installed, &r.tag))
    }

    /// Decides between `UpdateAvailable` and `UpToDate`, returning the asset to fetch.
    pub fn evaluate(
        &mut self,
        installed: &str,
        release: Option<&ReleaseDescriptor>,
    ) -> Option<ResolvedAsset> {
        let asset = release
            .filter(|r| version::update_available(installed, &r.tag))
            .and_then(|r| resolve_download_asset(&r.assets));

        match &asset {
            Some(asset) => {
                tracing::debug!("Update archive: {}", asset.url);
                self.transition(UpdateState::UpdateAvailable);
            }
            None => {
                if release.is_some_and(|r| version::update_available(installed, &r.tag)) {
                    tracing::info!("Release has no downloadable archive, nothing to do");
                }
                self.transition(UpdateState::UpToDate);
            }
        }
        asset
    }

    /// Builds the prompt shown when an update is available.
    ///
    /// The changelog is empty when the release list cannot be fetched.
    pub fn notice(
        &self,
        identity: &ReleaseIdentity,
        installed: &str,
        release: Option<&ReleaseDescriptor>,
    ) -> Option<UpgradeNotice> {
        let release = release.filter(|r| version::update_available(installed, &r.tag))?;
        let changelog_html = match self.source.releases(identity) {
            Ok(releases) => changelog::accumulate(&releases, installed),
            Err(e) => {
                tracing::warn!("Could not fetch release notes for {}: {}", identity, e);
                String::new()
            }
        };
        Some(UpgradeNotice {
            update_name: release.update_name().to_string(),
            changelog_html,
        })
    }

    /// Checks for an update and, when one exists, builds its notice.
    pub fn check_for_notice(
        &mut self,
        identity: &ReleaseIdentity,
        installed: &str,
    ) -> Option<UpgradeNotice> {
        let release = self.check(identity);
        self.evaluate(installed, release.as_ref())?;
        self.notice(identity, installed, release.as_ref())
    }

    /// Runs the update flow against the install root `working_dir`.
    ///
    /// With a production launcher a successful run never returns.
    pub fn update(
        &mut self,
        identity: &ReleaseIdentity,
        working_dir: &Path,
        installed: &str,
        executable: &str,
    ) -> Result<UpdateOutcome> {
        let release = self.check(identity);
        let Some(asset) = self.evaluate(installed, release.as_ref()) else {
            return Ok(UpdateOutcome::UpToDate);
        };
        let tag = release.map(|r| r.tag).unwrap_or_default();

        self.transition(UpdateState::Downloading);
        let staged = self.download(&asset, working_dir)?;

        self.transition(UpdateState::Extracting);
        extract(&staged, working_dir)?;

        self.transition(UpdateState::Relaunching);
        self.launcher.launch(working_dir, executable)?;
        self.transition(UpdateState::Terminated);
        Ok(UpdateOutcome::Relaunched { tag })
    }

    fn download(&self, asset: &ResolvedAsset, working_dir: &Path) -> Result<PathBuf> {
        let file_name = asset.file_name().ok_or_else(|| {
            UpdateError::MalformedMetadata(format!("download URL {} has no file name", asset.url))
        })?;

        let staging = working_dir.join(STAGING_DIR);
        fs::create_dir_all(&staging).map_err(|e| {
            UpdateError::Io(format!(
                "cannot create staging directory {}: {}",
                staging.display(),
                e
            ))
        })?;

        let dest = staging.join(file_name);
        self.downloader.download(&asset.url, &dest)?;
        Ok(dest)
    }

    /// Carries out the user's answer to an upgrade notice.
    ///
    /// `Update` restarts the updater from `self_copy` for `identity` in
    /// `working_dir`; with a production launcher it does not return.
    pub fn handle(
        &mut self,
        command: UpdateCommand,
        identity: &ReleaseIdentity,
        self_copy: &SelfCopy,
        working_dir: &Path,
        links: &impl LinkOpener,
    ) -> Result<()> {
        match command {
            UpdateCommand::Update => {
                self.transition(UpdateState::Relaunching);
                self_copy.relaunch(&self.launcher, identity, working_dir)?;
                self.transition(UpdateState::Terminated);
                Ok(())
            }
            UpdateCommand::OpenLink(url) => {
                tracing::debug!("Opening {}", url);
                links.open_link(&url)
            }
            UpdateCommand::Dismiss => {
                tracing::info!("Update dismissed");
                Ok(())
            }
        }
    }
}

impl<S, D, L: Launch> Orchestrator<S, D, L> {
    /// Runs the first-install flow for the bundled archive at `archive`.
    ///
    /// Returns the install directory when the launcher hands control back.
    pub fn install(
        &mut self,
        archive: &Path,
        chooser: &impl DirectoryChooser,
        executable: &str,
    ) -> Result<PathBuf> {
        self.transition(UpdateState::AwaitingUserDirectoryChoice);
        let Some(install_dir) = chooser.choose_directory() else {
            tracing::info!("Install directory prompt dismissed");
            return Err(UpdateError::UserCancelled);
        };
        tracing::info!("Installing into {}", install_dir.display());

        self.transition(UpdateState::StagingTempCopy);
        let mut builder = tempfile::Builder::new();
        builder.prefix(INSTALL_TEMP_PREFIX);
        // Dropped on every early return, which removes the staged copy.
        let staging = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let file_name = archive.file_name().ok_or_else(|| {
            UpdateError::Config(format!("archive path {} has no file name", archive.display()))
        })?;
        let staged = staging.path().join(file_name);
        fs::copy(archive, &staged).map_err(|e| {
            UpdateError::Io(format!(
                "cannot stage {} in {}: {}",
                archive.display(),
                staging.path().display(),
                e
            ))
        })?;

        self.transition(UpdateState::Extracting);
        extract(&staged, &install_dir)?;

        let staging_path = staging.path().to_path_buf();
        if let Err(e) = staging.close() {
            tracing::warn!(
                "Could not remove staging directory {}: {}",
                staging_path.display(),
                e
            );
        }

        self.transition(UpdateState::Relaunching);
        self.launcher.launch(&install_dir, executable)?;
        self.transition(UpdateState::Terminated);
        Ok(install_dir)
    }
}
