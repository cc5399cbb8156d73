//! Top-down directory traversal.
//!
//! Each visited directory comes with its immediate file and subdirectory
//! names, read when the directory is yielded.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One directory visited during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub files: Vec<String>,
    pub subdirs: Vec<String>,
}

impl WalkEntry {
    /// Read the immediate children of `path`
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_dir() {
                subdirs.push(name);
            } else {
                files.push(name);
            }
        }

        files.sort();
        subdirs.sort();

        Ok(Self {
            path: path.to_path_buf(),
            files,
            subdirs,
        })
    }

    /// File names followed by subdirectory names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().chain(&self.subdirs).map(String::as_str)
    }
}

/// Walk `root` in pre-order, yielding every directory that can be listed.
///
/// Unreadable directories end their branch without an error.
pub fn walk(root: &Path) -> impl Iterator<Item = WalkEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Skipping unreadable path: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| match WalkEntry::read(e.path()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Cannot list {}: {}", e.path().display(), err);
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::relative_name;
    use tempfile::tempdir;

    #[test]
    fn test_preorder_walk() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("Songs/SongA"))?;
        fs::create_dir_all(root.join("Songs/SongB"))?;
        fs::write(root.join("Songs/SongA/map1.osu"), b"")?;
        fs::write(root.join("Songs/SongA/audio.mp3"), b"")?;
        fs::write(root.join("readme.txt"), b"")?;

        let visited: Vec<WalkEntry> = walk(root).collect();
        let names: Vec<String> = visited.iter().map(|e| relative_name(&e.path, root)).collect();
        assert_eq!(names, vec!["", "Songs", "Songs/SongA", "Songs/SongB"]);

        assert_eq!(visited[0].files, vec!["readme.txt"]);
        assert_eq!(visited[0].subdirs, vec!["Songs"]);
        assert_eq!(visited[2].files, vec!["audio.mp3", "map1.osu"]);
        assert!(visited[3].files.is_empty());

        Ok(())
    }

    #[test]
    fn test_names_include_subdirs() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("Pack.osz"))?;
        fs::write(dir.path().join("a.osu"), b"")?;

        let entry = WalkEntry::read(dir.path())?;
        let names: Vec<&str> = entry.names().collect();
        assert_eq!(names, vec!["a.osu", "Pack.osz"]);

        Ok(())
    }

    #[test]
    fn test_missing_root_yields_nothing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        assert_eq!(walk(&dir.path().join("missing")).count(), 0);
        Ok(())
    }
}
