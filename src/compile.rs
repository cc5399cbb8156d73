//! Compile mode: bundle beatmap folders into `.osz` packages.
//!
//! Every file under a qualifying folder (symlinks to files included) is stored (no compression)
//! under its base name only. Subfolder structure is flattened away, which is
//! what the game client expects from a package.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, Result};
use crate::event::{Event, EventSink};
use crate::paths;
use crate::qualify::Qualifier;
use crate::runner::RunReport;
use crate::walker::WalkEntry;

/// A package written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPackage {
    pub path: PathBuf,
    /// Number of entries written
    pub entries: usize,
    /// Files dropped because an earlier file had the same base name
    pub duplicates: usize,
}

/// Result of trying to create a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Created(CompiledPackage),
    /// A package is already at the target path; it was left untouched
    AlreadyExists,
    /// The package file could not be created
    AccessDenied,
}

/// Compile `dir` into a new package at `archive`.
///
/// The archive is opened in exclusive-create mode. Failures after creation
/// remove the half-written file and are returned as errors.
pub fn compile_dir(dir: &Path, archive: &Path) -> Result<CompileOutcome> {
    let file = match OpenOptions::new().write(true).create_new(true).open(archive) {
        Ok(file) => file,
        Err(e) => {
            return match PackError::from_io(archive, e) {
                PackError::AlreadyExists(_) => Ok(CompileOutcome::AlreadyExists),
                PackError::PermissionDenied(_) => Ok(CompileOutcome::AccessDenied),
                other => Err(other),
            };
        }
    };

    match write_package(file, dir, archive) {
        Ok(package) => Ok(CompileOutcome::Created(package)),
        Err(err) => {
            if let Err(e) = fs::remove_file(archive) {
                tracing::warn!("Failed to remove partial package {}: {}", archive.display(), e);
            }
            Err(err)
        }
    }
}

fn write_package(file: File, dir: &Path, archive: &Path) -> Result<CompiledPackage> {
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut seen = HashSet::new();
    let mut duplicates = 0;

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| PackError::from_walk(dir, e))?;
        // Symlinked files are stored by content; linked folders are not entered
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !seen.insert(name.clone()) {
            tracing::warn!(
                "Duplicate file name '{}' in {}, keeping the first copy",
                name,
                dir.display()
            );
            duplicates += 1;
            continue;
        }

        let mut source =
            File::open(entry.path()).map_err(|e| PackError::from_io(entry.path(), e))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| PackError::from_zip_write(archive, e))?;
        io::copy(&mut source, &mut zip).map_err(|e| PackError::from_io(entry.path(), e))?;

        tracing::debug!("Stored {} as {}", entry.path().display(), name);
    }

    let mut writer = zip
        .finish()
        .map_err(|e| PackError::from_zip_write(archive, e))?;
    writer.flush().map_err(|e| PackError::from_io(archive, e))?;

    Ok(CompiledPackage {
        path: archive.to_path_buf(),
        entries: seen.len(),
        duplicates,
    })
}

/// Compile handler for one visited folder
pub fn compile_entry(
    entry: &WalkEntry,
    root: &Path,
    qualifier: &Qualifier<'_>,
    report: &mut RunReport,
    sink: &mut dyn EventSink,
) {
    if !qualifier.matches(entry.files.iter().map(String::as_str)) {
        return;
    }

    let archive = paths::package_path(&entry.path);
    let display = paths::package_display_name(&entry.path, root);

    let result = compile_dir(&entry.path, &archive);
    match &result {
        Ok(CompileOutcome::Created(package)) => tracing::debug!(
            "Wrote {} ({} entries)",
            package.path.display(),
            package.entries
        ),
        Err(err) => tracing::debug!("Compiling {} failed: {:?}", entry.path.display(), err),
        Ok(_) => {}
    }

    let (event, processed) = outcome_event(&result, display);
    sink.emit(event);
    if processed {
        report.processed += 1;
    } else {
        report.failed += 1;
    }
}

/// Event for a compile attempt, and whether the folder counts as processed.
///
/// Existing packages and denied creation still count; anything that failed
/// after the package was opened does not.
fn outcome_event(result: &Result<CompileOutcome>, display: String) -> (Event, bool) {
    match result {
        Ok(CompileOutcome::Created(_)) => (Event::success("Created []!", display), true),
        Ok(CompileOutcome::AlreadyExists) => {
            (Event::notice("[] already exists.", vec![display]), true)
        }
        Ok(CompileOutcome::AccessDenied) => {
            (Event::error("Access is denied to [].", vec![display]), true)
        }
        Err(err) => (Event::error(err.to_string(), Vec::new()), false),
    }
}
