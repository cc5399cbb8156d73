//! Error types for archive creation and extraction.
//!
//! Every failure the core can hit is mapped into a [`PackError`] so the run
//! controller can decide which event to emit without unwinding.

use std::io;
use std::path::{Path, PathBuf};

use zip::result::ZipError;

/// A failure while compiling a folder or extracting a package.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("access is denied to {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("{} is corrupted: {source}", .path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("{} is a directory", .0.display())]
    IsADirectory(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

impl PackError {
    /// Map an I/O error on `path` to the matching variant.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::AlreadyExists => PackError::AlreadyExists(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => PackError::PermissionDenied(path.to_path_buf()),
            _ => PackError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Map a zip error raised while reading `path`.
    ///
    /// Structural problems (bad signatures, truncated data, checksum
    /// mismatches) are reported as [`PackError::Corrupted`].
    pub fn from_zip_read(path: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(io_err)
                if matches!(
                    io_err.kind(),
                    io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
                ) =>
            {
                PackError::Corrupted {
                    path: path.to_path_buf(),
                    source: ZipError::Io(io_err),
                }
            }
            ZipError::Io(io_err) => Self::from_io(path, io_err),
            err @ (ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_)) => {
                PackError::Corrupted {
                    path: path.to_path_buf(),
                    source: err,
                }
            }
            err => PackError::Zip {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Map a zip error raised while writing `path`.
    pub fn from_zip_write(path: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(io_err) => Self::from_io(path, io_err),
            err => PackError::Zip {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Map a traversal error below `root`.
    pub fn from_walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        match err.into_io_error() {
            Some(io_err) => Self::from_io(&path, io_err),
            None => PackError::Io {
                path,
                source: io::Error::other("filesystem loop detected"),
            },
        }
    }

    /// Failures with a dedicated user-facing message.
    ///
    /// Everything else is reported through the generic error event.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            PackError::AlreadyExists(_) | PackError::PermissionDenied(_) | PackError::Corrupted { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
