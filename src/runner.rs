//! Run controller
//!
//! Walks the root once and hands every visited folder to the compile or
//! extract handler. Nothing escapes this loop: per-item failures become
//! events, and cancellation is honoured between folders.

use std::collections::HashSet;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::compile;
use crate::config::{Mode, RunConfig};
use crate::event::{Event, EventSink};
use crate::extract;
use crate::paths::{self, PACKAGE_EXTENSION, SOURCE_EXTENSION};
use crate::qualify::Qualifier;
use crate::walker;

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Folders or packages handled, including recoverable skips
    pub processed: usize,
    /// Items that failed with an error
    pub failed: usize,
    /// The run was cancelled before the walk finished
    pub interrupted: bool,
}

impl RunReport {
    /// True once anything was compiled, extracted or skipped as already done
    pub fn found_valid_files(&self) -> bool {
        self.processed > 0
    }
}

/// Execute a run, reporting progress to `sink`
pub fn run(config: &RunConfig, sink: &mut dyn EventSink, cancel: &AtomicBool) -> RunReport {
    let mut report = RunReport::default();

    // `Songs/` or `.` must not produce packages inside the root
    let root = match fs::canonicalize(&config.root) {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!("Cannot canonicalize {}: {}", config.root.display(), e);
            config.root.clone()
        }
    };
    let extension = match config.mode {
        Mode::Compile => SOURCE_EXTENSION,
        Mode::Extract => PACKAGE_EXTENSION,
    };
    let qualifier = Qualifier::new(extension, &config.extra_listing);
    let mut expanded = HashSet::new();

    tracing::debug!(
        "Starting {} run in {}",
        config.mode,
        root.display()
    );

    for entry in walker::walk(&root) {
        if cancel.load(Ordering::Relaxed) {
            sink.emit(Event::notice("Interrupted by user.", Vec::new()));
            report.interrupted = true;
            break;
        }

        let rel = paths::relative_name(&entry.path, &root);
        let shown = if rel.is_empty() { "(root)" } else { rel.as_str() };
        sink.emit(Event::running(format!("Checking folder: {shown}")));

        match config.mode {
            Mode::Compile => {
                compile::compile_entry(&entry, &root, &qualifier, &mut report, sink)
            }
            Mode::Extract => {
                extract::extract_entry(&entry, &qualifier, &mut expanded, &mut report, sink)
            }
        }
    }

    if !report.found_valid_files() {
        sink.emit(Event::notice("No valid files/folders found.", Vec::new()));
    }

    tracing::debug!(
        "Run finished: {} processed, {} failed",
        report.processed,
        report.failed
    );
    report
}
