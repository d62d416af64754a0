//! On-disk layout of a run.
//!
//! ```text
//! <base>/<YYYY-MM-DD-HH-MM-SS>/
//!   manifest.m3u8          only after every rendition succeeded
//!   <rendition>/index.m3u8
//!   <rendition>/segment_000.ts, segment_001.ts, ...
//! ```
//!
//! File names are part of the player compatibility contract and never vary
//! by rendition or run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Master manifest file name at the run root.
pub const MANIFEST_FILENAME: &str = "manifest.m3u8";
/// Rendition playlist file name inside each rendition directory.
pub const PLAYLIST_FILENAME: &str = "index.m3u8";
/// ffmpeg pattern for numbered segment files.
pub const SEGMENT_PATTERN: &str = "segment_%03d.ts";

/// Run directory name format. Lexicographic order equals chronological order.
const RUN_DIR_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Directory name for a run started at `started_at`.
pub fn run_dir_name<Tz: TimeZone>(started_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    started_at.format(RUN_DIR_FORMAT).to_string()
}

/// Paths of one run's output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Describe the layout for `base/<run_name>` without touching disk.
    pub fn new(base: &Path, run_name: &str) -> Self {
        Self {
            root: base.join(run_name),
        }
    }

    /// Create the run root under `base`.
    ///
    /// `base` must already exist. The root itself is created non-recursively,
    /// so an existing root (another run with the same start second) is an
    /// error rather than a shared tree.
    pub fn create(base: &Path, run_name: &str) -> Result<Self> {
        if !base.is_dir() {
            return Err(PipelineError::OutputLocationUnavailable {
                path: base.to_path_buf(),
            });
        }

        let layout = Self::new(base, run_name);
        std::fs::create_dir(&layout.root).map_err(|e| PipelineError::directory(&layout.root, e))?;

        tracing::debug!("Created run root {}", layout.root.display());
        Ok(layout)
    }

    /// Create the sub-directory for one rendition. An already present
    /// directory is accepted.
    pub fn create_rendition_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.rendition_dir(name);
        if dir.is_dir() {
            return Ok(dir);
        }
        std::fs::create_dir_all(&dir).map_err(|e| PipelineError::directory(&dir, e))?;
        Ok(dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn into_root(self) -> PathBuf {
        self.root
    }

    pub fn rendition_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn rendition_playlist(&self, name: &str) -> PathBuf {
        self.rendition_dir(name).join(PLAYLIST_FILENAME)
    }

    pub fn segment_pattern(&self, name: &str) -> PathBuf {
        self.rendition_dir(name).join(SEGMENT_PATTERN)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILENAME)
    }

    /// Whether this run completed: the master manifest is the only signal.
    pub fn is_complete(&self) -> bool {
        self.manifest_path().is_file()
    }
}

/// Manifest URI for a rendition, relative to the run root.
pub fn rendition_uri(name: &str) -> String {
    format!("{name}/{PLAYLIST_FILENAME}")
}

/// A finished run found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedRun {
    /// Run directory name (the start timestamp).
    pub name: String,
    /// Run root directory.
    pub root: PathBuf,
    /// Path to the master manifest.
    pub manifest: PathBuf,
}

/// List completed runs under `base`, newest first.
///
/// Only directories holding a master manifest count; partial or failed runs
/// are skipped, as are hidden entries. A missing `base` yields an empty list.
pub fn list_completed_runs(base: &Path) -> Result<Vec<CompletedRun>> {
    let entries = match std::fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(_) => {
            return Err(PipelineError::OutputLocationUnavailable {
                path: base.to_path_buf(),
            })
        }
    };

    let mut runs: Vec<CompletedRun> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                return None;
            }
            let layout = OutputLayout::new(base, &name);
            (layout.root().is_dir() && layout.is_complete()).then(|| CompletedRun {
                manifest: layout.manifest_path(),
                root: layout.into_root(),
                name,
            })
        })
        .collect();

    runs.sort_by(|a, b| b.name.cmp(&a.name));
    Ok(runs)
}
