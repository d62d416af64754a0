//! HLS master playlist generation.
//!
//! Builds the top-level playlist that lists one `#EXT-X-STREAM-INF` variant
//! per rendition, reads it back, and writes it atomically. Rendition
//! playlists and segments are written by the encoder, not here.

mod generator;
mod parser;
mod types;
mod writer;

pub use generator::{build_master_manifest, generate_master_playlist};
pub use parser::parse_master_playlist;
pub use types::{MasterPlaylist, Variant, MASTER_PLAYLIST_VERSION};
pub use writer::write_atomic;
