//! Configuration types.
//!
//! The top-level [`Config`] is deserialized from TOML. Every section
//! defaults so an empty file is valid and reproduces the built-in ladder and
//! encode policy exactly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PipelineError, Result};
use crate::rendition::{RenditionLadder, RenditionSpec};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub tools: ToolsConfig,
    pub encode: EncodePolicy,
    /// Replaces the built-in ladder when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ladder: Option<Vec<RenditionSpec>>,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| PipelineError::Config(format!("parse error: {e}")))
    }

    /// The ladder to encode: the configured one if any, else the built-in.
    pub fn ladder(&self) -> Result<RenditionLadder> {
        match &self.ladder {
            Some(rows) => RenditionLadder::new(rows.clone()),
            None => Ok(RenditionLadder::plan()),
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref p) = self.tools.ffmpeg_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    p.display()
                ));
            }
        }

        warnings.extend(self.encode.validate());

        if let Ok(ladder) = self.ladder() {
            warnings.extend(ladder.warnings());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Where run roots are created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./encoded"),
        }
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

/// Host-dependent part of the encode policy.
///
/// Only the encoder name and the `-allow_sw` flag vary by host. GOP, segment
/// duration, profile, level, pixel format and audio settings are fixed in
/// `lf_av::args`; naming them here is a config error rather than an override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodePolicy {
    pub video_encoder: String,
    /// Emit `-allow_sw 1`. Only meaningful for VideoToolbox.
    pub allow_software_fallback: bool,
}

impl Default for EncodePolicy {
    fn default() -> Self {
        Self {
            video_encoder: "h264_videotoolbox".into(),
            allow_software_fallback: true,
        }
    }
}

impl EncodePolicy {
    fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.allow_software_fallback && !self.video_encoder.ends_with("_videotoolbox") {
            warnings.push(format!(
                "encode.allow_software_fallback is set but {} is not a VideoToolbox encoder; \
                 ffmpeg will reject -allow_sw",
                self.video_encoder
            ));
        }

        warnings
    }
}
