//! Integration tests for merging archives into install roots.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use leapfrog_updater::{UpdateError, extract};

/// Builds a zip at `path`; entries ending in `/` are directories.
fn build_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Relative path -> contents (`None` for directories) of everything under `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    let mut entries = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let relative = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                entries.insert(relative, None);
                pending.push(path);
            } else {
                entries.insert(relative, Some(fs::read(&path).unwrap()));
            }
        }
    }
    entries
}

#[test]
fn test_extract_twice_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    let archive = temp.path().join("widget.zip");
    build_archive(
        &archive,
        &[
            ("lib/", b""),
            ("lib/core.jar", b"core"),
            ("widget.jar", b"main"),
            ("docs/readme.txt", b"read me"),
        ],
    );
    let root = temp.path().join("install");

    extract(&archive, &root).unwrap();
    let once = snapshot(&root);

    let second = extract(&archive, &root).unwrap();
    assert_eq!(snapshot(&root), once);
    assert_eq!(second.files_written, 3);
    assert_eq!(second.directories_created, 0);
    assert!(second.collisions_skipped.is_empty());
}

#[test]
fn test_extract_merges_into_existing_root() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("install");
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(root.join("widget.jar"), b"old main").unwrap();
    fs::write(root.join("config/user.properties"), b"theme=dark").unwrap();

    let archive = temp.path().join("widget.zip");
    build_archive(
        &archive,
        &[("widget.jar", b"new main"), ("plugins/extra.jar", b"extra")],
    );

    extract(&archive, &root).unwrap();

    assert_eq!(fs::read(root.join("widget.jar")).unwrap(), b"new main");
    assert_eq!(fs::read(root.join("plugins/extra.jar")).unwrap(), b"extra");
    // Files absent from the archive survive
    assert_eq!(
        fs::read(root.join("config/user.properties")).unwrap(),
        b"theme=dark"
    );
}

#[test]
fn test_extract_tolerates_non_empty_directory_collision() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("install");
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/keep.txt"), b"keep").unwrap();

    let archive = temp.path().join("widget.zip");
    build_archive(&archive, &[("data", b"file"), ("widget.jar", b"main")]);

    let summary = extract(&archive, &root).unwrap();

    assert_eq!(summary.collisions_skipped, vec![PathBuf::from("data")]);
    assert_eq!(fs::read(root.join("data/keep.txt")).unwrap(), b"keep");
    assert_eq!(fs::read(root.join("widget.jar")).unwrap(), b"main");
}

#[test]
fn test_extract_rejects_escaping_entries() {
    let temp = tempfile::tempdir().unwrap();
    let archive = temp.path().join("evil.zip");
    build_archive(&archive, &[("../outside.txt", b"nope")]);
    let root = temp.path().join("install");

    let result = extract(&archive, &root);

    assert!(matches!(result, Err(UpdateError::ArchiveExtraction(_))));
    assert!(!temp.path().join("outside.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_extract_preserves_unix_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let archive = temp.path().join("widget.zip");
    let mut writer = ZipWriter::new(File::create(&archive).unwrap());
    writer
        .start_file(
            "bin/widget.sh",
            SimpleFileOptions::default().unix_permissions(0o755),
        )
        .unwrap();
    writer.write_all(b"#!/bin/sh\n").unwrap();
    writer.finish().unwrap();

    let root = temp.path().join("install");
    extract(&archive, &root).unwrap();

    let mode = fs::metadata(root.join("bin/widget.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}
