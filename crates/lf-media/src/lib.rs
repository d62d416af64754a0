//! lf-media: HLS master playlist generation, parsing and atomic writes.
//!
//! # Modules
//!
//! - [`hls`] - master playlist types, generator, parser and writer
//! - [`error`] - errors raised when reading a playlist back

pub mod error;
pub mod hls;

use std::path::{Path, PathBuf};

use lf_core::layout::MANIFEST_FILENAME;
use lf_core::{PipelineError, RenditionSpec};

// Re-export commonly used items at the crate root.
pub use error::Error;
pub use hls::{
    build_master_manifest, generate_master_playlist, parse_master_playlist, write_atomic,
    MasterPlaylist, Variant,
};

/// Build the master manifest for `renditions` and write it atomically to
/// `manifest.m3u8` under `root`. Returns the manifest path.
pub fn write_master_manifest(
    root: &Path,
    renditions: &[RenditionSpec],
) -> lf_core::Result<PathBuf> {
    let path = root.join(MANIFEST_FILENAME);
    let text = build_master_manifest(renditions);
    write_atomic(&path, &text)
        .map_err(|source| PipelineError::ManifestWriteFailed { path: path.clone(), source })?;
    Ok(path)
}

/// Read and parse the master manifest under `root`.
pub fn read_master_manifest(root: &Path) -> Result<MasterPlaylist, Error> {
    let text = std::fs::read_to_string(root.join(MANIFEST_FILENAME))
        .map_err(|e| Error::invalid(0, format!("cannot read manifest: {e}")))?;
    parse_master_playlist(&text)
}
