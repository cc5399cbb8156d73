//! osutool - compile and extract osu! beatmap packages
//!
//! Compile bundles every folder holding `.osu` files into a sibling `.osz`
//! package. Extract expands `.osz` packages into folders of the same name.

pub mod compile;
pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod paths;
pub mod qualify;
pub mod runner;
pub mod walker;

pub use config::{ConfigError, Mode, RunConfig};
pub use event::{Event, EventKind, EventSink};
pub use runner::{run, RunReport};
