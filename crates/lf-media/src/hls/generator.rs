//! HLS master playlist generation.

use super::types::MasterPlaylist;
use lf_core::RenditionSpec;
use std::fmt::Write;

/// Generate an HLS master playlist (M3U8) from a [`MasterPlaylist`].
///
/// Every line, including the last URI, ends with `\n`.
pub fn generate_master_playlist(playlist: &MasterPlaylist) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "#EXTM3U");
    let _ = writeln!(out, "#EXT-X-VERSION:{}", playlist.version);

    for variant in &playlist.variants {
        let _ = write!(out, "#EXT-X-STREAM-INF:BANDWIDTH={}", variant.bandwidth);

        if let Some(avg) = variant.average_bandwidth {
            let _ = write!(out, ",AVERAGE-BANDWIDTH={avg}");
        }

        if let Some((w, h)) = variant.resolution {
            let _ = write!(out, ",RESOLUTION={w}x{h}");
        }

        if !variant.codecs.is_empty() {
            let _ = write!(out, ",CODECS=\"{}\"", variant.codecs);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", variant.uri);
    }

    out
}

/// Render the master manifest for a ladder, in ladder order.
pub fn build_master_manifest(renditions: &[RenditionSpec]) -> String {
    generate_master_playlist(&MasterPlaylist::from_renditions(renditions))
}
