//! Streamed asset download with progress reporting.
//!
//! The response body is copied straight to the destination file through an
//! `indicatif` progress bar. Progress is display only and never affects the
//! outcome; the bar hides itself when stderr is not a terminal.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::error::{Result, UpdateError};
use crate::github::GitHubClient;
use crate::github::client::check_status;
use crate::source::Downloader;

/// Template for downloads with a known length.
const BAR_TEMPLATE: &str =
    "{msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Template for downloads without a `Content-Length`.
const SPINNER_TEMPLATE: &str = "{spinner} {msg} {bytes} ({bytes_per_sec})";

impl Downloader for GitHubClient {
    fn download(&self, url: &Url, dest: &Path) -> Result<u64> {
        tracing::info!("Downloading {} to {}", url, dest.display());

        let response = self
            .downloads
            .get(url.clone())
            .send()
            .map_err(|e| UpdateError::Network(e.to_string()))?;
        let response = check_status(response)?;

        let bar = progress_bar(response.content_length(), &file_label(dest));
        let mut reader = bar.wrap_read(response);

        let mut writer = BufWriter::new(File::create(dest)?);
        let written = io::copy(&mut reader, &mut writer).map_err(|e| {
            UpdateError::Network(format!("download of {} interrupted: {}", url, e))
        })?;
        writer.flush()?;
        bar.finish_and_clear();

        tracing::info!("Download complete: {}", format_bytes(written));
        Ok(written)
    }
}

/// Builds the progress decorator for a download of `len` bytes, if known.
fn progress_bar(len: Option<u64>, label: &str) -> ProgressBar {
    let (bar, template) = match len {
        Some(len) => (ProgressBar::new(len), BAR_TEMPLATE),
        None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
    };
    match ProgressStyle::with_template(template) {
        Ok(style) => bar.set_style(style.progress_chars("=> ")),
        Err(e) => tracing::debug!("Falling back to default progress style: {}", e),
    }
    bar.set_message(format!("Downloading {label}"));
    bar
}

fn file_label(dest: &Path) -> String {
    dest.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dest.display().to_string())
}

/// Format bytes as a human-readable string.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
