//! Selection of the downloadable archive among a release's assets.

use url::Url;

use crate::release::AssetDescriptor;

/// The only archive content type the installer consumes.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/x-zip-compressed";

/// An asset chosen for download, with its URL already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// The asset as listed by the release.
    pub asset: AssetDescriptor,
    /// Parsed download URL.
    pub url: Url,
}

impl ResolvedAsset {
    /// File name taken from the final path segment of the URL.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
    }
}

/// Returns the first asset whose content type is the archive type.
///
/// First match wins. If that asset's URL does not parse the result is `None`;
/// later candidates are not consulted.
#[must_use]
pub fn resolve_download_asset(assets: &[AssetDescriptor]) -> Option<ResolvedAsset> {
    let asset = assets
        .iter()
        .find(|asset| asset.content_type == ARCHIVE_CONTENT_TYPE)?;

    match Url::parse(&asset.download_url) {
        Ok(url) => Some(ResolvedAsset {
            asset: asset.clone(),
            url,
        }),
        Err(e) => {
            tracing::warn!("Ignoring archive asset with malformed URL {:?}: {}", asset.download_url, e);
            None
        }
    }
}
