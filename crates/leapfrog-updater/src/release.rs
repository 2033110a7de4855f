//! Release metadata as seen by the update engine.

use std::fmt;

/// Repository identity a release is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIdentity {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository / project name.
    pub project: String,
}

impl ReleaseIdentity {
    /// Creates an identity from owner and project names.
    pub fn new(owner: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
        }
    }

    /// Arguments that select this identity on the updater command line.
    #[must_use]
    pub fn to_args(&self) -> [String; 2] {
        [self.owner.clone(), self.project.clone()]
    }
}

impl fmt::Display for ReleaseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.project)
    }
}

/// Parsed metadata for one remote release.
///
/// Missing fields are defaulted to empty rather than rejected, so every
/// downstream decision treats them as "nothing to do".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Release tag (e.g., "v1.2").
    pub tag: String,
    /// Release title; may be empty.
    pub display_name: String,
    /// Release notes in markdown.
    pub notes_body: String,
    /// Downloadable assets in API order.
    pub assets: Vec<AssetDescriptor>,
}

impl ReleaseDescriptor {
    /// Name shown to the user: the title, or the tag when the title is empty.
    #[must_use]
    pub fn update_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.tag
        } else {
            &self.display_name
        }
    }
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// MIME content type reported by the repository.
    pub content_type: String,
    /// Direct download URL.
    pub download_url: String,
}
