//! GitHub API types.

use serde::{Deserialize, Deserializer};

use crate::release::{AssetDescriptor, ReleaseDescriptor};

/// Raw release data from the GitHub API.
///
/// Every field is optional on the wire; absent or `null` values become empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubRelease {
    /// The release tag name (e.g., "v0.1.0").
    #[serde(deserialize_with = "null_as_default")]
    pub tag_name: String,

    /// The release title/name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Release notes/body in markdown format.
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,

    /// Release assets (binaries, archives, etc.).
    #[serde(deserialize_with = "null_as_default")]
    pub assets: Vec<GitHubAsset>,
}

/// Release asset data from the GitHub API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubAsset {
    /// Content type (e.g., "application/x-zip-compressed").
    #[serde(deserialize_with = "null_as_default")]
    pub content_type: String,

    /// Direct download URL.
    #[serde(deserialize_with = "null_as_default")]
    pub browser_download_url: String,
}

impl From<GitHubRelease> for ReleaseDescriptor {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag: release.tag_name,
            display_name: release.name,
            notes_body: release.body,
            assets: release.assets.into_iter().map(AssetDescriptor::from).collect(),
        }
    }
}

impl From<GitHubAsset> for AssetDescriptor {
    fn from(asset: GitHubAsset) -> Self {
        Self {
            content_type: asset.content_type,
            download_url: asset.browser_download_url,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_release_converts() {
        let json = r###"{
            "tag_name": "v2.1",
            "name": "Version 2.1",
            "body": "## Changes\n- Faster scans",
            "draft": false,
            "assets": [
                {
                    "name": "App-2.1.zip",
                    "content_type": "application/x-zip-compressed",
                    "browser_download_url": "https://example.com/App-2.1.zip",
                    "size": 1024
                }
            ]
        }"###;

        let release: ReleaseDescriptor = serde_json::from_str::<GitHubRelease>(json).unwrap().into();
        assert_eq!(release.tag, "v2.1");
        assert_eq!(release.display_name, "Version 2.1");
        assert!(release.notes_body.contains("Faster scans"));
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].content_type, "application/x-zip-compressed");
        assert_eq!(release.assets[0].download_url, "https://example.com/App-2.1.zip");
    }

    #[test]
    fn test_missing_and_null_fields_default_to_empty() {
        let json = r#"{ "tag_name": "v1", "name": null, "body": null }"#;
        let release: ReleaseDescriptor = serde_json::from_str::<GitHubRelease>(json).unwrap().into();
        assert_eq!(release.tag, "v1");
        assert!(release.display_name.is_empty());
        assert!(release.notes_body.is_empty());
        assert!(release.assets.is_empty());
    }

    #[test]
    fn test_release_list_parses() {
        let json = r#"[{ "tag_name": "v3" }, { "tag_name": "v2" }]"#;
        let releases: Vec<GitHubRelease> = serde_json::from_str(json).unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[1].tag_name, "v2");
    }
}
