//! Deterministic encoder arguments for one rendition.

use std::path::Path;

use lf_core::{EncodePolicy, OutputLayout, RenditionSpec};

// Fixed for every rendition and every host.
const VIDEO_PROFILE: &str = "main";
const VIDEO_LEVEL: &str = "4.0";
const PIXEL_FORMAT: &str = "yuv420p";
/// Two seconds at 24 fps; with scene-cut keyframes off, segment cuts land
/// on keyframes.
const GOP_SIZE: &str = "48";
const AUDIO_CODEC: &str = "aac";
const AUDIO_PROFILE: &str = "aac_low";
const AUDIO_BITRATE: &str = "128k";
const AUDIO_CHANNELS: &str = "2";
const AUDIO_SAMPLE_RATE: &str = "48000";
const SEGMENT_DURATION_SECS: &str = "6";

/// Scale to fit inside `width`x`height` keeping aspect ratio, then pad with
/// centred content to exactly that size.
pub fn video_filter(width: u32, height: u32) -> String {
    format!(
        "format={PIXEL_FORMAT},scale=w={width}:h={height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
    )
}

/// Full ffmpeg argument list (without the program name) that encodes
/// `source` into `spec`'s directory of `layout` as a VOD HLS rendition.
///
/// `policy` only chooses the encoder and the `-allow_sw` flag. The same
/// inputs always produce the same list.
pub fn encode_args(
    source: &Path,
    spec: &RenditionSpec,
    layout: &OutputLayout,
    policy: &EncodePolicy,
) -> Vec<String> {
    let playlist = layout.rendition_playlist(&spec.name);
    let segments = layout.segment_pattern(&spec.name);

    let mut args: Vec<String> = Vec::with_capacity(48);
    let mut push = |items: &[&str]| args.extend(items.iter().map(|s| s.to_string()));

    push(&["-y", "-i", &source.to_string_lossy()]);

    push(&["-vf", &video_filter(spec.width, spec.height)]);

    push(&[
        "-c:v",
        &policy.video_encoder,
        "-profile:v",
        VIDEO_PROFILE,
        "-level",
        VIDEO_LEVEL,
        "-pix_fmt",
        PIXEL_FORMAT,
    ]);
    if policy.allow_software_fallback {
        push(&["-allow_sw", "1"]);
    }

    push(&[
        "-b:v",
        &spec.video_bitrate,
        "-maxrate",
        &spec.max_bitrate,
        "-bufsize",
        &spec.buffer_size,
    ]);

    push(&["-g", GOP_SIZE, "-sc_threshold", "0"]);

    push(&[
        "-c:a",
        AUDIO_CODEC,
        "-profile:a",
        AUDIO_PROFILE,
        "-b:a",
        AUDIO_BITRATE,
        "-ac",
        AUDIO_CHANNELS,
        "-ar",
        AUDIO_SAMPLE_RATE,
    ]);

    push(&[
        "-hls_time",
        SEGMENT_DURATION_SECS,
        "-hls_playlist_type",
        "vod",
        "-hls_flags",
        "independent_segments",
        "-hls_segment_filename",
        &segments.to_string_lossy(),
    ]);

    push(&[&playlist.to_string_lossy()]);

    args
}
