//! lf-core: shared error type, configuration, rendition ladder and output
//! layout.
//!
//! This crate is the foundational dependency for the other lf-* crates. It
//! performs no encoding itself; the only I/O it does is creating and listing
//! run directories.

pub mod config;
pub mod error;
pub mod layout;
pub mod rendition;

// Re-export the most commonly used items at the crate root.
pub use config::{Config, EncodePolicy};
pub use error::{PipelineError, Result};
pub use layout::{list_completed_runs, run_dir_name, CompletedRun, OutputLayout};
pub use rendition::{RenditionLadder, RenditionSpec};
