//! Run configuration
//!
//! Defines the resolved inputs for a single compile or extract run.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What a run does with the folders it visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bundle folders holding `.osu` files into `.osz` packages
    Compile,
    /// Expand `.osz` packages into folders
    Extract,
}

impl Mode {
    /// Resolve a user token. Anything starting with `c` or `e` is accepted,
    /// case-insensitively.
    pub fn from_token(token: &str) -> Option<Mode> {
        match token.trim_start().chars().next()?.to_ascii_lowercase() {
            'c' => Some(Mode::Compile),
            'e' => Some(Mode::Extract),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compile => f.write_str("compile"),
            Mode::Extract => f.write_str("extract"),
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::from_token(s).ok_or_else(|| ConfigError::InvalidMode(s.to_string()))
    }
}

/// Configuration for a single run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory to walk
    pub root: PathBuf,

    /// Compile or extract
    pub mode: Mode,

    /// Names from the invocation directory. A match here qualifies every
    /// visited folder, mirroring how the tool has always behaved.
    pub extra_listing: Vec<String>,
}

impl RunConfig {
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            root: root.into(),
            mode,
            extra_listing: Vec::new(),
        }
    }

    /// Attach the listing of the invocation directory
    pub fn with_extra_listing(mut self, listing: Vec<String>) -> Self {
        self.extra_listing = listing;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.exists() {
            return Err(ConfigError::RootNotFound(self.root.clone()));
        }

        if !self.root.is_dir() {
            return Err(ConfigError::RootNotDirectory(self.root.clone()));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("Unknown mode '{0}' (expected compile or extract)")]
    InvalidMode(String),
}
