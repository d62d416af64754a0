//! HLS master playlist types.

use serde::{Deserialize, Serialize};

use lf_core::layout::rendition_uri;
use lf_core::RenditionSpec;

/// Playlist version written to `#EXT-X-VERSION`.
pub const MASTER_PLAYLIST_VERSION: u32 = 3;

/// A stream variant in a master playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Peak bandwidth in bits per second.
    pub bandwidth: u64,
    /// Average bandwidth in bits per second.
    pub average_bandwidth: Option<u64>,
    /// Optional resolution as (width, height).
    pub resolution: Option<(u32, u32)>,
    /// Codec string (e.g. "avc1.64001F,mp4a.40.2").
    pub codecs: String,
    /// URI to the media playlist for this variant, relative to the master.
    pub uri: String,
}

impl From<&RenditionSpec> for Variant {
    fn from(spec: &RenditionSpec) -> Self {
        Self {
            bandwidth: spec.bandwidth,
            average_bandwidth: Some(spec.average_bandwidth),
            resolution: Some((spec.width, spec.height)),
            codecs: spec.codecs.clone(),
            uri: rendition_uri(&spec.name),
        }
    }
}

/// An HLS master playlist listing every rendition of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterPlaylist {
    pub version: u32,
    /// Stream variants in ladder order.
    pub variants: Vec<Variant>,
}

impl MasterPlaylist {
    /// One variant per rendition, in the given order.
    pub fn from_renditions<'a>(renditions: impl IntoIterator<Item = &'a RenditionSpec>) -> Self {
        Self {
            version: MASTER_PLAYLIST_VERSION,
            variants: renditions.into_iter().map(Variant::from).collect(),
        }
    }
}
