//! Release check, archive install and relaunch engine.
//!
//! This crate keeps an installed application in sync with the latest release
//! of a GitHub repository. It supports:
//!
//! - Comparing the installed version token against the latest release tag
//! - Selecting the zip archive among a release's assets
//! - Streaming the archive into an `updates` staging directory with progress
//! - Merging the archive into the install root without removing extra files
//! - Relaunching the application on its managed runtime and exiting
//! - Restarting the updater itself from a temporary copy of its own binary
//!
//! # Architecture
//!
//! [`Orchestrator`] is a synchronous state machine over three seams:
//!
//! - [`ReleaseSource`] - release metadata ([`GitHubClient`] in production)
//! - [`Downloader`] - streamed downloads ([`GitHubClient`] in production)
//! - [`Launch`] - process handoff ([`ProcessLauncher`] in production)
//!
//! Release metadata is returned by [`Orchestrator::check`] and passed back in
//! explicitly; a failed fetch is `None`, which every decision treats as
//! "nothing to do".
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use leapfrog_updater::{GitHubClient, InstalledVersion, Orchestrator, ProcessLauncher, ReleaseIdentity};
//!
//! fn update() -> leapfrog_updater::Result<()> {
//!     let client = GitHubClient::new()?;
//!     let launcher = ProcessLauncher::discover(None);
//!     let mut orchestrator = Orchestrator::new(&client, &client, launcher);
//!
//!     let identity = ReleaseIdentity::new("octo", "widget");
//!     let installed = InstalledVersion::current();
//!     orchestrator.update(&identity, Path::new("."), installed.as_str(), "widget.jar")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod release;
pub mod version;

// Pipeline components
pub mod changelog;
pub mod download;
pub mod extract;
pub mod handoff;
pub mod launch;
pub mod orchestrator;
pub mod resolve;
pub mod source;

// GitHub API
pub mod github;

// Re-export main types for convenience
pub use error::{Result, UpdateError};
pub use extract::{ExtractSummary, extract};
pub use github::GitHubClient;
pub use handoff::SelfCopy;
pub use launch::{Launch, ProcessLauncher};
pub use orchestrator::{
    DirectoryChooser, LinkOpener, Orchestrator, UpdateCommand, UpdateOutcome, UpdateState,
    UpgradeNotice,
};
pub use release::{AssetDescriptor, ReleaseDescriptor, ReleaseIdentity};
pub use resolve::{ARCHIVE_CONTENT_TYPE, ResolvedAsset, resolve_download_asset};
pub use source::{Downloader, ReleaseSource};
pub use version::{InstalledVersion, update_available};
