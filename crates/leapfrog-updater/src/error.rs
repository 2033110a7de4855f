//! Error types for the update engine.

use thiserror::Error;

/// Errors that can occur while checking, downloading, installing or relaunching.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UpdateError {
    /// Release metadata fetch or asset download failed.
    #[error("network error: {0}")]
    Network(String),

    /// GitHub API rate limit exceeded.
    #[error("GitHub API rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds until rate limit resets.
        retry_after: u64,
    },

    /// Release metadata could not be parsed or lacks a required field.
    #[error("malformed release metadata: {0}")]
    MalformedMetadata(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(String),

    /// Archive could not be read or an entry could not be written.
    #[error("archive extraction error: {0}")]
    ArchiveExtraction(String),

    /// The replacement process could not be started.
    #[error("launch error: {0}")]
    Launch(String),

    /// The bundled install configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The user dismissed the install directory chooser.
    #[error("installation cancelled by user")]
    UserCancelled,
}

impl UpdateError {
    /// Returns a user-friendly error message suitable for a prompt.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => {
                "Could not connect to GitHub. Please check your internet connection."
            }
            Self::RateLimited { .. } => "GitHub API rate limit reached. Please try again later.",
            Self::MalformedMetadata(_) => "The release information could not be understood.",
            Self::ArchiveExtraction(_) => "Could not extract the update package.",
            Self::Launch(_) => "The updated application could not be started.",
            Self::Config(_) => "The installer configuration is missing or invalid.",
            Self::UserCancelled => "Installation cancelled.",
            Self::Io(_) => "An unexpected error occurred.",
        }
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedMetadata(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for UpdateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMetadata(err.to_string())
    }
}

impl From<url::ParseError> for UpdateError {
    fn from(err: url::ParseError) -> Self {
        Self::MalformedMetadata(err.to_string())
    }
}

impl From<zip::result::ZipError> for UpdateError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::ArchiveExtraction(err.to_string())
    }
}

/// Result type alias for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = UpdateError::Network("connection refused".to_string());
        assert!(err.user_message().contains("internet connection"));

        let err = UpdateError::UserCancelled;
        assert!(err.user_message().contains("cancelled"));

        let err = UpdateError::Launch("no such file".to_string());
        assert!(err.user_message().contains("could not be started"));
    }

    #[test]
    fn test_io_conversion_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err = UpdateError::from(io);
        assert!(matches!(err, UpdateError::Io(ref msg) if msg.contains("locked")));
    }

    #[test]
    fn test_url_parse_is_malformed_metadata() {
        let err = UpdateError::from(url::Url::parse("not a url").unwrap_err());
        assert!(matches!(err, UpdateError::MalformedMetadata(_)));
    }
}
