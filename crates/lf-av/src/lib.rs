//! # lf-av
//!
//! Encoding side of ladderforge.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   capture for probes and cancellable stderr streaming for encodes.
//! - **Encoder boundary** ([`Encoder`], [`FfmpegEncoder`]) -- one call per
//!   rendition, answered with the engine's exit code.
//! - **Argument construction** ([`encode_args`]) -- the deterministic ffmpeg
//!   argument list for a rendition.
//! - **Orchestration** ([`TranscodePipeline`]) -- sequential per-rendition
//!   encodes, progress lines, and the master manifest on success.
//! - **Verification** ([`verify_run`]) -- probe rendition frame sizes.

pub mod args;
pub mod command;
pub mod encoder;
pub mod log;
pub mod pipeline;
pub mod tools;
pub mod verify;

// ---- Re-exports for convenience ----

pub use args::{encode_args, video_filter};
pub use command::{RunOutcome, ToolCommand, ToolOutput};
pub use encoder::{Encoder, FfmpegEncoder};
pub use log::{log_channel, EncodeLog, EncodeLogSink};
pub use pipeline::{PipelineHandle, TranscodePipeline};
pub use tools::{ToolInfo, ToolRegistry};
pub use verify::{probe_dimensions, verify_run, VariantCheck};
