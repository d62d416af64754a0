//! Error types for lf-media.

use thiserror::Error;

/// Result type for lf-media parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised while reading back a master playlist.
#[derive(Debug, Error)]
pub enum Error {
    /// The text does not start with `#EXTM3U`.
    #[error("Missing #EXTM3U header")]
    MissingHeader,

    /// A tag or attribute could not be parsed.
    #[error("Invalid playlist at line {line}: {message}")]
    Invalid { line: usize, message: String },

    /// A `#EXT-X-STREAM-INF` tag was not followed by a URI line.
    #[error("Stream at line {line} has no URI")]
    MissingUri { line: usize },
}

impl Error {
    pub(crate) fn invalid(line: usize, message: impl Into<String>) -> Self {
        Self::Invalid {
            line,
            message: message.into(),
        }
    }
}
