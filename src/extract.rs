//! Extract mode: expand `.osz` packages into folders next to them.
//!
//! A qualifying folder gets a second, nested walk over its whole subtree.
//! Every entry named `*.osz` found there (files and folder names alike) is
//! expanded into `<parent>/<name without extension>/`.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{PackError, Result};
use crate::event::{Event, EventSink};
use crate::paths::{self, PACKAGE_EXTENSION};
use crate::qualify::Qualifier;
use crate::runner::RunReport;
use crate::walker::WalkEntry;

/// Every `.osz` entry below `dir`, at any depth, in walk order.
pub fn find_packages(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| paths::has_extension(&e.file_name().to_string_lossy(), PACKAGE_EXTENSION))
        .map(|e| e.into_path())
}

/// Expand `archive` into `target`, returning the number of files written.
///
/// The archive is opened before `target` is created, so a package that is
/// not a readable zip leaves nothing behind. Existing files are overwritten.
pub fn extract_package(archive: &Path, target: &Path) -> Result<usize> {
    if archive.is_dir() {
        return Err(PackError::IsADirectory(archive.to_path_buf()));
    }

    let file = File::open(archive).map_err(|e| PackError::from_io(archive, e))?;
    let mut zip =
        ZipArchive::new(BufReader::new(file)).map_err(|e| PackError::from_zip_read(archive, e))?;

    fs::create_dir_all(target).map_err(|e| PackError::from_io(target, e))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| PackError::from_zip_read(archive, e))?;

        let Some(rel_path) = entry.enclosed_name() else {
            tracing::warn!(
                "Skipping unsafe entry '{}' in {}",
                entry.name(),
                archive.display()
            );
            continue;
        };
        let out_path = target.join(rel_path);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| PackError::from_io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PackError::from_io(parent, e))?;
        }

        let mut out = File::create(&out_path).map_err(|e| PackError::from_io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            // Checksum and decompression failures surface as InvalidData
            if e.kind() == io::ErrorKind::InvalidData {
                PackError::from_zip_read(archive, ZipError::Io(e))
            } else {
                PackError::from_io(&out_path, e)
            }
        })?;

        written += 1;
    }

    tracing::debug!(
        "Expanded {} into {} ({} files)",
        archive.display(),
        target.display(),
        written
    );
    Ok(written)
}

/// Extract handler for one visited folder
///
/// `expanded` holds packages already handled this run; nested qualifying
/// folders would otherwise expand the same package once per ancestor.
pub fn extract_entry(
    entry: &WalkEntry,
    qualifier: &Qualifier<'_>,
    expanded: &mut HashSet<PathBuf>,
    report: &mut RunReport,
    sink: &mut dyn EventSink,
) {
    if !qualifier.matches(entry.names()) {
        return;
    }

    for package in find_packages(&entry.path) {
        if !expanded.insert(package.clone()) {
            tracing::debug!("Already expanded {} this run", package.display());
            continue;
        }

        let name = paths::file_name(&package);
        let target = paths::extraction_dir(&package);

        match extract_package(&package, &target) {
            Ok(_) => {
                sink.emit(Event::success("Extracted []!", name));
                report.processed += 1;
            }
            Err(err) => {
                tracing::debug!("Extracting {} failed: {:?}", package.display(), err);
                sink.emit(failure_event(&err, name));
                report.failed += 1;
            }
        }
    }
}

/// Error event for a package that could not be expanded
fn failure_event(err: &PackError, name: String) -> Event {
    match err {
        PackError::Corrupted { .. } => Event::error(
            "[] is corrupted and could not be extracted.",
            vec![name],
        ),
        PackError::PermissionDenied(_) => Event::error("Access is denied to [].", vec![name]),
        err => Event::error(err.to_string(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_package(path: &Path, files: &[(&str, &[u8])]) -> anyhow::Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        let options = SimpleFileOptions::default();
        for (name, data) in files {
            zip.start_file(*name, options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }

    fn sorted_names(dir: &Path) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    #[test]
    fn test_extract_package() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("SongA.osz");
        write_package(&archive, &[("map1.osu", b"map"), ("audio.mp3", b"ID3")])?;

        let target = paths::extraction_dir(&archive);
        assert_eq!(extract_package(&archive, &target)?, 2);
        assert_eq!(sorted_names(&target)?, vec!["audio.mp3", "map1.osu"]);
        assert_eq!(fs::read(target.join("map1.osu"))?, b"map");

        Ok(())
    }

    #[test]
    fn test_extract_again_overwrites() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("SongA.osz");
        write_package(&archive, &[("map1.osu", b"original")])?;

        let target = paths::extraction_dir(&archive);
        extract_package(&archive, &target)?;
        fs::write(target.join("map1.osu"), b"edited")?;

        extract_package(&archive, &target)?;
        assert_eq!(fs::read(target.join("map1.osu"))?, b"original");

        Ok(())
    }

    #[test]
    fn test_extract_nested_entries() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("Skin.osz");
        write_package(&archive, &[("skin.ini", b"[General]"), ("sounds/hit.wav", b"RIFF")])?;

        let target = paths::extraction_dir(&archive);
        assert_eq!(extract_package(&archive, &target)?, 2);
        assert!(target.join("sounds/hit.wav").is_file());

        Ok(())
    }

    #[test]
    fn test_corrupted_package_creates_nothing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("Broken.osz");
        fs::write(&archive, b"this is not a zip file at all")?;

        let target = paths::extraction_dir(&archive);
        let err = extract_package(&archive, &target).unwrap_err();
        assert!(matches!(err, PackError::Corrupted { .. }), "got {:?}", err);
        assert!(!target.exists());

        Ok(())
    }

    #[test]
    fn test_directory_named_like_package() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let fake = dir.path().join("Folder.osz");
        fs::create_dir(&fake)?;

        let err = extract_package(&fake, &paths::extraction_dir(&fake)).unwrap_err();
        assert!(matches!(err, PackError::IsADirectory(_)));
        assert!(!err.is_expected());

        Ok(())
    }

    #[test]
    fn test_find_packages_any_depth() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("Songs/Packs"))?;
        fs::create_dir(root.join("Songs/Folder.osz"))?;
        fs::write(root.join("Songs/SongA.osz"), b"")?;
        fs::write(root.join("Songs/Packs/SongB.osz"), b"")?;
        fs::write(root.join("Songs/readme.txt"), b"")?;

        let found: Vec<String> = find_packages(&root.join("Songs"))
            .map(|p| paths::relative_name(&p, root))
            .collect();
        assert_eq!(
            found,
            vec!["Songs/Folder.osz", "Songs/Packs/SongB.osz", "Songs/SongA.osz"]
        );

        Ok(())
    }

    #[test]
    fn test_failure_events() {
        let event = failure_event(
            &PackError::PermissionDenied(PathBuf::from("Songs/SongA.osz")),
            "SongA.osz".to_string(),
        );
        assert_eq!(event.kind, EventKind::Error);
        assert_eq!(event.message(), "Access is denied to [SongA.osz].");

        let event = failure_event(
            &PackError::IsADirectory(PathBuf::from("Songs/Folder.osz")),
            "Folder.osz".to_string(),
        );
        assert_eq!(event.message(), "Songs/Folder.osz is a directory");
        assert!(event.names.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_package_not_processed() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let archive = dir.path().join("SongA.osz");
        write_package(&archive, &[("map1.osu", b"map")])?;
        fs::set_permissions(&archive, fs::Permissions::from_mode(0o000))?;

        // Privileged users can still read the file
        let readable = File::open(&archive).is_ok();
        let entry = WalkEntry::read(dir.path())?;
        let qualifier = Qualifier::new(PACKAGE_EXTENSION, &[]);
        let mut expanded = HashSet::new();
        let mut report = RunReport::default();
        let mut events: Vec<Event> = Vec::new();

        extract_entry(&entry, &qualifier, &mut expanded, &mut report, &mut events);
        fs::set_permissions(&archive, fs::Permissions::from_mode(0o644))?;
        if readable {
            return Ok(());
        }

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message(), "Access is denied to [SongA.osz].");
        assert_eq!(report.processed, 0);
        assert_eq!(report.failed, 1);
        assert!(!dir.path().join("SongA").exists());

        Ok(())
    }

    #[test]
    fn test_extract_entry_events() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let songs = dir.path().join("Songs");
        fs::create_dir(&songs)?;
        write_package(&songs.join("SongA.osz"), &[("map1.osu", b"")])?;
        fs::write(songs.join("SongB.osz"), b"not a zip, just some bytes that look nothing like one")?;

        let entry = WalkEntry::read(&songs)?;
        let qualifier = Qualifier::new(PACKAGE_EXTENSION, &[]);
        let mut expanded = HashSet::new();
        let mut report = RunReport::default();
        let mut events: Vec<Event> = Vec::new();

        extract_entry(&entry, &qualifier, &mut expanded, &mut report, &mut events);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Success);
        assert_eq!(events[0].message(), "Extracted [SongA.osz]!");
        assert_eq!(events[1].kind, EventKind::Error);
        assert_eq!(
            events[1].message(),
            "[SongB.osz] is corrupted and could not be extracted."
        );
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert!(songs.join("SongA/map1.osu").is_file());
        assert!(!songs.join("SongB").exists());

        // Same packages reached again through another folder are skipped
        extract_entry(&entry, &qualifier, &mut expanded, &mut report, &mut events);
        assert_eq!(events.len(), 2);

        Ok(())
    }
}
