//! Self-replacement of the running updater.
//!
//! The updater binary ships inside the release archive, so an update may need
//! to overwrite the very file that is executing. Instead of overwriting it in
//! place, the running process:
//!
//! 1. copies its own binary to a sibling temporary file,
//! 2. starts that copy with the repository identity as arguments,
//! 3. exits.
//!
//! The copy performs the update and is free to replace the original binary.
//! Nobody deletes the copy in that generation: the next ordinary run removes
//! it during startup, before any network access. A run never deletes the
//! file it is itself executing from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdateError};
use crate::launch::Launch;
use crate::release::ReleaseIdentity;

/// Marker inserted between the binary stem and its extension.
const COPY_MARKER: &str = "tmp";

/// The updater binary and the path of its temporary self-copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCopy {
    executable: PathBuf,
    copy: PathBuf,
}

impl SelfCopy {
    /// Describes the self-copy for the binary at `executable`.
    ///
    /// `leapfrog` pairs with `leapfrog.tmp`, `leapfrog.exe` with `leapfrog.tmp.exe`.
    #[must_use]
    pub fn for_executable(executable: impl Into<PathBuf>) -> Self {
        let executable = executable.into();
        let copy = copy_path(&executable);
        Self { executable, copy }
    }

    /// Describes the self-copy for the running binary.
    pub fn current() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| {
            UpdateError::Io(format!("cannot determine current executable path: {e}"))
        })?;
        Ok(Self::for_executable(original_of(&exe)))
    }

    /// The original updater binary.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The temporary sibling copy.
    #[must_use]
    pub fn copy_path(&self) -> &Path {
        &self.copy
    }

    /// Removes a copy left behind by a previous generation.
    ///
    /// `running` is the binary of the current process; a copy that is the
    /// running binary is kept. Returns whether a file was removed.
    pub fn cleanup_stale(&self, running: &Path) -> Result<bool> {
        if same_file(&self.copy, running) {
            tracing::debug!(
                "Running from self-copy {}, leaving it for the next run",
                self.copy.display()
            );
            return Ok(false);
        }

        match fs::remove_file(&self.copy) {
            Ok(()) => {
                tracing::info!("Removed stale updater copy {}", self.copy.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(UpdateError::Io(format!(
                "cannot remove stale updater copy {}: {}",
                self.copy.display(),
                e
            ))),
        }
    }

    /// Copies the updater binary to the temporary sibling, replacing any old copy.
    pub fn prepare(&self) -> Result<&Path> {
        fs::copy(&self.executable, &self.copy).map_err(|e| {
            UpdateError::Io(format!(
                "cannot copy {} to {}: {}",
                self.executable.display(),
                self.copy.display(),
                e
            ))
        })?;
        tracing::debug!(
            "Copied updater {} to {}",
            self.executable.display(),
            self.copy.display()
        );
        Ok(&self.copy)
    }

    /// Copies the updater, starts the copy for `identity` from `working_dir` and exits.
    ///
    /// Returns only when the launcher does not terminate the process, or on error.
    pub fn relaunch<L: Launch + ?Sized>(
        &self,
        launcher: &L,
        identity: &ReleaseIdentity,
        working_dir: &Path,
    ) -> Result<()> {
        let copy = self.prepare()?;
        tracing::info!("Restarting updater from {} for {}", copy.display(), identity);
        launcher.handoff(copy, &identity.to_args(), working_dir)
    }
}

/// Sibling temporary path for `executable`.
fn copy_path(executable: &Path) -> PathBuf {
    let stem = executable
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match executable.extension() {
        Some(ext) => format!("{stem}.{COPY_MARKER}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{COPY_MARKER}"),
    };
    executable.with_file_name(name)
}

/// Maps a self-copy path back to its original binary; other paths map to themselves.
fn original_of(executable: &Path) -> PathBuf {
    let Some(name) = executable.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return executable.to_path_buf();
    };
    let marker = format!(".{COPY_MARKER}");
    if let Some(stem) = name.strip_suffix(&marker) {
        return executable.with_file_name(stem);
    }
    if let Some((base, ext)) = name.rsplit_once('.')
        && let Some(stem) = base.strip_suffix(&marker)
    {
        return executable.with_file_name(format!("{stem}.{ext}"));
    }
    executable.to_path_buf()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
