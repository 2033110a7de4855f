//! In-place archive installation.
//!
//! The archive is treated as a tree rooted at the destination directory and
//! merged into it: directories are created when missing, files overwrite any
//! existing file of the same name, and files absent from the archive are left
//! untouched. Extraction is not transactional; an error part-way through leaves
//! the destination partially updated.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, NaiveDate, TimeZone};
use zip::ZipArchive;

use crate::error::{Result, UpdateError};

/// Outcome of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Directories created because they did not exist yet.
    pub directories_created: usize,
    /// Files written (new or overwritten).
    pub files_written: usize,
    /// File entries skipped because a non-empty directory occupies their path.
    pub collisions_skipped: Vec<PathBuf>,
}

/// Extracts the archive at `archive` into `destination`, merging with its contents.
pub fn extract(archive: &Path, destination: &Path) -> Result<ExtractSummary> {
    tracing::info!(
        "Extracting {} into {}",
        archive.display(),
        destination.display()
    );

    let file = File::open(archive).map_err(|e| {
        UpdateError::ArchiveExtraction(format!("cannot open {}: {}", archive.display(), e))
    })?;
    let summary = extract_from(BufReader::new(file), destination)?;

    tracing::info!(
        "Extraction complete: {} files, {} new directories, {} skipped",
        summary.files_written,
        summary.directories_created,
        summary.collisions_skipped.len()
    );
    Ok(summary)
}

/// Extracts a zip stream into `destination`.
pub fn extract_from<R: Read + Seek>(reader: R, destination: &Path) -> Result<ExtractSummary> {
    let mut archive = ZipArchive::new(reader)?;
    let mut summary = ExtractSummary::default();

    if !destination.exists() {
        fs::create_dir_all(destination)?;
        summary.directories_created += 1;
    }

    for (index, relative, is_dir) in walk_order(&mut archive)? {
        let target = destination.join(&relative);

        if is_dir {
            if create_dir_if_absent(&target)? {
                summary.directories_created += 1;
            }
            continue;
        }

        // Parents may lack their own directory entry.
        if let Some(parent) = target.parent() {
            summary.directories_created += create_missing_ancestors(parent, destination)?;
        }

        let mut entry = archive.by_index(index)?;
        match prepare_file_target(&target)? {
            Target::Writable => {}
            Target::NonEmptyDirectory => {
                tracing::warn!(
                    "Skipping {}: a non-empty directory already exists at {}",
                    relative.display(),
                    target.display()
                );
                summary.collisions_skipped.push(relative);
                continue;
            }
        }

        let modified = entry.last_modified();
        let mode = entry.unix_mode();
        write_file(&mut entry, &target)?;
        copy_attributes(&target, modified, mode)?;
        summary.files_written += 1;
        tracing::debug!("Wrote {}", target.display());
    }

    Ok(summary)
}

/// Returns `(index, relative path, is_dir)` for every entry, parents before children.
fn walk_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<(usize, PathBuf, bool)>> {
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            UpdateError::ArchiveExtraction(format!(
                "entry {:?} escapes the destination directory",
                entry.name()
            ))
        })?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        entries.push((index, relative, entry.is_dir()));
    }

    // Component-wise ordering puts every directory before its contents.
    entries.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

/// Creates `dir` unless it already exists; returns whether it was created.
fn create_dir_if_absent(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    match fs::create_dir(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(false),
        Err(e) => Err(UpdateError::Io(format!(
            "cannot create directory {}: {}",
            dir.display(),
            e
        ))),
    }
}

/// Creates every missing directory between `root` and `dir`, returning how many.
fn create_missing_ancestors(dir: &Path, root: &Path) -> Result<usize> {
    let mut missing = Vec::new();
    let mut current = dir;
    while current != root && !current.is_dir() {
        missing.push(current);
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    let mut created = 0;
    for dir in missing.into_iter().rev() {
        if create_dir_if_absent(dir)? {
            created += 1;
        }
    }
    Ok(created)
}

enum Target {
    Writable,
    NonEmptyDirectory,
}

/// Makes `target` ready to receive a file.
///
/// An empty directory in the way is removed; a non-empty one is reported.
fn prepare_file_target(target: &Path) -> Result<Target> {
    let Ok(metadata) = fs::symlink_metadata(target) else {
        return Ok(Target::Writable);
    };

    if metadata.is_dir() {
        match fs::remove_dir(target) {
            Ok(()) => Ok(Target::Writable),
            Err(_) if fs::read_dir(target).is_ok_and(|mut it| it.next().is_some()) => {
                Ok(Target::NonEmptyDirectory)
            }
            Err(e) => Err(UpdateError::Io(format!(
                "cannot replace directory {}: {}",
                target.display(),
                e
            ))),
        }
    } else {
        if metadata.permissions().readonly() {
            // Previous installs may have left read-only files behind.
            let mut permissions = metadata.permissions();
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(target, permissions)?;
        }
        Ok(Target::Writable)
    }
}

fn write_file(entry: &mut impl Read, target: &Path) -> Result<()> {
    let file = File::create(target).map_err(|e| {
        UpdateError::ArchiveExtraction(format!("cannot write {}: {}", target.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    io::copy(entry, &mut writer).map_err(|e| {
        UpdateError::ArchiveExtraction(format!("cannot write {}: {}", target.display(), e))
    })?;
    writer.flush()?;
    Ok(())
}

/// Applies the entry's modification time and, on Unix, its permission bits.
fn copy_attributes(
    target: &Path,
    modified: Option<zip::DateTime>,
    mode: Option<u32>,
) -> Result<()> {
    if let Some(modified) = modified.and_then(to_system_time) {
        let file = File::options().write(true).open(target)?;
        file.set_modified(modified)?;
    }

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, fs::Permissions::from_mode(mode & 0o7777))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Converts an MS-DOS zip timestamp, which is local wall-clock time.
///
/// Times that do not exist or are ambiguous in the local zone are skipped.
fn to_system_time(timestamp: zip::DateTime) -> Option<SystemTime> {
    let naive = NaiveDate::from_ymd_opt(
        i32::from(timestamp.year()),
        u32::from(timestamp.month()),
        u32::from(timestamp.day()),
    )?
    .and_hms_opt(
        u32::from(timestamp.hour()),
        u32::from(timestamp.minute()),
        u32::from(timestamp.second()),
    )?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(SystemTime::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_system_time() {
        let timestamp = zip::DateTime::from_date_and_time(2024, 3, 15, 10, 30, 0).unwrap();
        let system = to_system_time(timestamp).unwrap();
        let expected: SystemTime = Local
            .with_ymd_and_hms(2024, 3, 15, 10, 30, 0)
            .single()
            .unwrap()
            .into();
        assert_eq!(system, expected);
    }

    #[test]
    fn test_create_dir_if_absent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("lib");
        assert!(create_dir_if_absent(&dir).unwrap());
        assert!(!create_dir_if_absent(&dir).unwrap());
    }

    #[test]
    fn test_prepare_replaces_empty_directory() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("app.jar");
        fs::create_dir(&target).unwrap();
        assert!(matches!(prepare_file_target(&target).unwrap(), Target::Writable));
        assert!(!target.exists());
    }

    #[test]
    fn test_prepare_reports_non_empty_directory() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("app.jar");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"x").unwrap();
        assert!(matches!(
            prepare_file_target(&target).unwrap(),
            Target::NonEmptyDirectory
        ));
        assert!(target.join("keep.txt").exists());
    }

    #[test]
    fn test_corrupt_archive_is_extraction_error() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();
        let result = extract(&archive, &temp.path().join("out"));
        assert!(matches!(result, Err(UpdateError::ArchiveExtraction(_))));
    }
}
