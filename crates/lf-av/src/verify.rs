//! Post-run check that each rendition really has the advertised frame size.
//!
//! For every variant of a run's master manifest, the first media segment
//! listed in the variant playlist is probed with ffprobe and its video
//! dimensions compared against the variant's `RESOLUTION`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use lf_core::{PipelineError, Result};

use crate::command::ToolCommand;

const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of probing one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantCheck {
    /// Variant URI as written in the master manifest.
    pub uri: String,
    /// Segment that was probed.
    pub segment: PathBuf,
    pub expected: Option<(u32, u32)>,
    pub actual: (u32, u32),
}

impl VariantCheck {
    /// True when the probed size matches the advertised one (or none was
    /// advertised).
    pub fn matches(&self) -> bool {
        self.expected.map_or(true, |e| e == self.actual)
    }
}

/// Probe the first video stream of `file` and return `(width, height)`.
pub async fn probe_dimensions(ffprobe: &Path, file: &Path) -> Result<(u32, u32)> {
    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0:s=x",
        ])
        .arg(file.to_string_lossy())
        .timeout(PROBE_TIMEOUT)
        .execute()
        .await?;

    parse_dimensions(&output.stdout).ok_or_else(|| {
        PipelineError::tool(
            "ffprobe",
            format!("unexpected output for {}: {:?}", file.display(), output.stdout.trim()),
        )
    })
}

/// Parse ffprobe's `WIDTHxHEIGHT` line.
fn parse_dimensions(stdout: &str) -> Option<(u32, u32)> {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (w, h) = line.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// First media segment referenced by a variant playlist.
fn first_segment(playlist: &Path) -> Result<PathBuf> {
    let text = std::fs::read_to_string(playlist).map_err(|e| {
        PipelineError::tool("verify", format!("cannot read {}: {e}", playlist.display()))
    })?;
    let dir = playlist.parent().unwrap_or_else(|| Path::new("."));

    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|uri| dir.join(uri))
        .ok_or_else(|| {
            PipelineError::tool("verify", format!("{} lists no segments", playlist.display()))
        })
}

/// Probe every variant of the completed run at `root`.
///
/// Mismatches are reported in the returned checks, not as errors; errors
/// mean the run could not be inspected at all.
pub async fn verify_run(ffprobe: &Path, root: &Path) -> Result<Vec<VariantCheck>> {
    let master = lf_media::read_master_manifest(root)
        .map_err(|e| PipelineError::tool("verify", format!("{}: {e}", root.display())))?;

    let mut checks = Vec::with_capacity(master.variants.len());
    for variant in &master.variants {
        let segment = first_segment(&root.join(&variant.uri))?;
        let actual = probe_dimensions(ffprobe, &segment).await?;
        tracing::debug!(
            "{}: expected {:?}, probed {}x{}",
            variant.uri,
            variant.resolution,
            actual.0,
            actual.1
        );
        checks.push(VariantCheck {
            uri: variant.uri.clone(),
            segment,
            expected: variant.resolution,
            actual,
        });
    }
    Ok(checks)
}
