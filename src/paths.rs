//! Naming rules for packages and extracted folders
//!
//! - `Songs/SongA/` compiles to `Songs/SongA.osz`
//! - `Songs/SongA.osz` extracts to `Songs/SongA/`
//! - Display names are relative to the walk root and always use `/`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix of uncompiled beatmap files
pub const SOURCE_EXTENSION: &str = ".osu";

/// Suffix of compiled beatmap packages
pub const PACKAGE_EXTENSION: &str = ".osz";

/// Check a name against a suffix (case-sensitive, like the game client)
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.ends_with(extension)
}

/// Path of the package produced from `dir`: `<parent>/<folder name>.osz`
///
/// Built from the last component, so `Songs/` and `Songs` both give
/// `Songs.osz` beside the folder. A path without a final name (`.`, `..`, `/`)
/// must be canonicalized first; it falls back to appending the extension.
pub fn package_path(dir: &Path) -> PathBuf {
    match (dir.parent(), dir.file_name()) {
        (Some(parent), Some(name)) => {
            let mut file: OsString = name.to_owned();
            file.push(PACKAGE_EXTENSION);
            parent.join(file)
        }
        _ => {
            let mut raw: OsString = dir.as_os_str().to_owned();
            raw.push(PACKAGE_EXTENSION);
            PathBuf::from(raw)
        }
    }
}

/// Display name of the package for `dir`, relative to `root`
///
/// The root itself has no relative name, so its folder name is used.
pub fn package_display_name(dir: &Path, root: &Path) -> String {
    let rel = relative_name(dir, root);
    let base = if rel.is_empty() {
        file_name(dir)
    } else {
        rel
    };
    format!("{base}{PACKAGE_EXTENSION}")
}

/// Folder an archive at `archive` expands into: its name up to the last `.`
pub fn extraction_dir(archive: &Path) -> PathBuf {
    let name = file_name(archive);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name.as_str(),
    };
    match archive.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

/// Last component of `path` as a lossy string
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Display form of `path` relative to `root`, with `/` separators
pub fn relative_name(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
