//! The rendition ladder: a small ordered table of output quality tiers.
//!
//! The ladder is plain data. Its order is the variant order in the master
//! manifest and the order in which renditions are encoded. Manifest bandwidth
//! figures are hand-picked per row and are deliberately not derived from the
//! encoder bitrates.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// One fixed-quality output of the source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenditionSpec {
    /// Identifier and sub-directory name (e.g. "720p").
    pub name: String,
    /// Exact output width after scale-and-pad.
    pub width: u32,
    /// Exact output height after scale-and-pad.
    pub height: u32,
    /// Target video bitrate as an encoder string (e.g. "2800k").
    pub video_bitrate: String,
    /// Rate-control ceiling (e.g. "2996k").
    pub max_bitrate: String,
    /// Rate-control buffer size (e.g. "4200k").
    pub buffer_size: String,
    /// Peak bandwidth advertised in the master manifest, bits/s.
    pub bandwidth: u64,
    /// Average bandwidth advertised in the master manifest, bits/s.
    pub average_bandwidth: u64,
    /// CODECS attribute, copied verbatim into the manifest.
    pub codecs: String,
}

impl RenditionSpec {
    fn row(
        name: &str,
        (width, height): (u32, u32),
        (video_bitrate, max_bitrate, buffer_size): (&str, &str, &str),
        (bandwidth, average_bandwidth): (u64, u64),
        codecs: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            video_bitrate: video_bitrate.to_string(),
            max_bitrate: max_bitrate.to_string(),
            buffer_size: buffer_size.to_string(),
            bandwidth,
            average_bandwidth,
            codecs: codecs.to_string(),
        }
    }

    /// `WxH` as it appears in the RESOLUTION attribute.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// An ordered, non-empty sequence of [`RenditionSpec`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenditionLadder {
    renditions: Vec<RenditionSpec>,
}

impl Default for RenditionLadder {
    fn default() -> Self {
        Self::plan()
    }
}

impl RenditionLadder {
    /// The built-in three-tier ladder. Always succeeds, never empty.
    pub fn plan() -> Self {
        Self {
            renditions: vec![
                RenditionSpec::row(
                    "1080p",
                    (1920, 1080),
                    ("5000k", "5350k", "7500k"),
                    (6_000_000, 5_000_000),
                    "avc1.640028,mp4a.40.2",
                ),
                RenditionSpec::row(
                    "720p",
                    (1280, 720),
                    ("2800k", "2996k", "4200k"),
                    (3_500_000, 2_800_000),
                    "avc1.64001F,mp4a.40.2",
                ),
                RenditionSpec::row(
                    "480p",
                    (854, 480),
                    ("1400k", "1498k", "2100k"),
                    (2_000_000, 1_400_000),
                    "avc1.64001E,mp4a.40.2",
                ),
            ],
        }
    }

    /// Build a ladder from explicit rows, validating them first.
    pub fn new(renditions: Vec<RenditionSpec>) -> Result<Self> {
        let ladder = Self { renditions };
        ladder.validate()?;
        Ok(ladder)
    }

    pub fn renditions(&self) -> &[RenditionSpec] {
        &self.renditions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenditionSpec> {
        self.renditions.iter()
    }

    pub fn len(&self) -> usize {
        self.renditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renditions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RenditionSpec> {
        self.renditions.iter().find(|r| r.name == name)
    }

    /// Hard checks: anything here would produce an unplayable or unsafe
    /// output tree.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(PipelineError::InvalidLadder(
                "ladder must contain at least one rendition".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for r in &self.renditions {
            if !is_safe_component(&r.name) {
                return Err(PipelineError::InvalidLadder(format!(
                    "rendition name '{}' is not a single path component",
                    r.name
                )));
            }
            if !seen.insert(r.name.as_str()) {
                return Err(PipelineError::InvalidLadder(format!(
                    "duplicate rendition name '{}'",
                    r.name
                )));
            }
            if r.width == 0 || r.height == 0 {
                return Err(PipelineError::InvalidLadder(format!(
                    "{}: dimensions must be positive, got {}",
                    r.name,
                    r.resolution()
                )));
            }
            // yuv420p chroma subsampling needs even dimensions.
            if r.width % 2 != 0 || r.height % 2 != 0 {
                return Err(PipelineError::InvalidLadder(format!(
                    "{}: dimensions must be even, got {}",
                    r.name,
                    r.resolution()
                )));
            }
            for (field, value) in [
                ("video_bitrate", &r.video_bitrate),
                ("max_bitrate", &r.max_bitrate),
                ("buffer_size", &r.buffer_size),
            ] {
                if parse_bitrate(value).is_none() {
                    return Err(PipelineError::InvalidLadder(format!(
                        "{}: {field} '{value}' is not a bitrate like '2800k'",
                        r.name
                    )));
                }
            }
            if r.codecs.is_empty() || r.codecs.contains('"') {
                return Err(PipelineError::InvalidLadder(format!(
                    "{}: codecs must be non-empty and unquoted",
                    r.name
                )));
            }
        }

        Ok(())
    }

    /// Soft checks on manifest figures. These rows are tuned by hand, so
    /// deviations are reported, never corrected.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for r in &self.renditions {
            if r.bandwidth < r.average_bandwidth {
                warnings.push(format!(
                    "{}: bandwidth {} is below average_bandwidth {}",
                    r.name, r.bandwidth, r.average_bandwidth
                ));
            }
            if let Some(bps) = parse_bitrate(&r.video_bitrate) {
                if bps != r.average_bandwidth {
                    warnings.push(format!(
                        "{}: average_bandwidth {} differs from video_bitrate {} ({bps} b/s)",
                        r.name, r.average_bandwidth, r.video_bitrate
                    ));
                }
            }
            if let (Some(rate), Some(max)) =
                (parse_bitrate(&r.video_bitrate), parse_bitrate(&r.max_bitrate))
            {
                if max < rate {
                    warnings.push(format!(
                        "{}: max_bitrate {} is below video_bitrate {}",
                        r.name, r.max_bitrate, r.video_bitrate
                    ));
                }
            }
        }

        warnings
    }
}

impl<'a> IntoIterator for &'a RenditionLadder {
    type Item = &'a RenditionSpec;
    type IntoIter = std::slice::Iter<'a, RenditionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.renditions.iter()
    }
}

/// Parse an encoder bitrate string (`"2800k"`, `"5M"`, `"128000"`) into bits
/// per second. Suffixes are decimal, as ffmpeg reads them.
pub fn parse_bitrate(s: &str) -> Option<u64> {
    let s = s.trim();
    let (digits, multiplier) = match s.as_bytes().last()? {
        b'k' | b'K' => (&s[..s.len() - 1], 1_000),
        b'm' | b'M' => (&s[..s.len() - 1], 1_000_000),
        _ => (s, 1),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}

fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}
