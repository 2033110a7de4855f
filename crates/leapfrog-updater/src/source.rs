//! Seams between the orchestrator and the outside world.
//!
//! The orchestrator only needs parsed release metadata and a way to stream a
//! URL into a file. [`crate::github::GitHubClient`] implements both against
//! the GitHub REST API; tests substitute in-memory fakes.

use std::path::Path;

use url::Url;

use crate::error::Result;
use crate::release::{ReleaseDescriptor, ReleaseIdentity};

/// Source of release metadata for a repository.
pub trait ReleaseSource {
    /// Fetches the latest published release.
    fn latest_release(&self, identity: &ReleaseIdentity) -> Result<ReleaseDescriptor>;

    /// Fetches all releases, newest first.
    fn releases(&self, identity: &ReleaseIdentity) -> Result<Vec<ReleaseDescriptor>>;
}

/// Streams remote files to disk.
pub trait Downloader {
    /// Downloads `url` into `dest`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    fn download(&self, url: &Url, dest: &Path) -> Result<u64>;
}

impl<T: ReleaseSource + ?Sized> ReleaseSource for &T {
    fn latest_release(&self, identity: &ReleaseIdentity) -> Result<ReleaseDescriptor> {
        (**self).latest_release(identity)
    }

    fn releases(&self, identity: &ReleaseIdentity) -> Result<Vec<ReleaseDescriptor>> {
        (**self).releases(identity)
    }
}

impl<T: Downloader + ?Sized> Downloader for &T {
    fn download(&self, url: &Url, dest: &Path) -> Result<u64> {
        (**self).download(url, dest)
    }
}
