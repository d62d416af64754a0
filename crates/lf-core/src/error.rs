//! Unified error type for a ladderforge run.
//!
//! Every failure is terminal to the run that raised it. Each variant carries
//! the stage name, exit status or path needed to surface it verbatim.

use std::path::PathBuf;

/// Failure modes of planning, encoding and manifest writing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The output base directory is missing or is not a directory.
    #[error("Output location unavailable: {}", path.display())]
    OutputLocationUnavailable {
        /// The base directory that was requested.
        path: PathBuf,
    },

    /// A run root or rendition sub-directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The encoding engine exited with a non-zero status.
    #[error("Encode failed ({stage}) with exit code {code}")]
    EncodeFailed {
        /// Rendition name being encoded.
        stage: String,
        /// Engine exit status.
        code: i32,
    },

    /// The encoding engine could not be launched at all.
    #[error("Encoder unavailable ({stage}): {message}")]
    EngineUnavailable {
        /// Rendition name that was about to be encoded.
        stage: String,
        /// Human-readable error description.
        message: String,
    },

    /// The master manifest could not be written to the run root.
    #[error("Failed to write master manifest {}: {source}", path.display())]
    ManifestWriteFailed {
        /// Target manifest path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An auxiliary tool (ffprobe, version checks) failed.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The run was cancelled before or during `stage`.
    #[error("Run cancelled at {stage}")]
    Cancelled {
        /// Rendition that was pending or running when cancellation landed.
        stage: String,
    },

    /// The rendition ladder failed validation.
    #[error("Invalid rendition ladder: {0}")]
    InvalidLadder(String),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Convenience constructor for [`PipelineError::DirectoryCreationFailed`].
    pub fn directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::DirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Convenience constructor for [`PipelineError::EncodeFailed`].
    pub fn encode(stage: impl Into<String>, code: i32) -> Self {
        PipelineError::EncodeFailed {
            stage: stage.into(),
            code,
        }
    }

    /// Convenience constructor for [`PipelineError::EngineUnavailable`].
    pub fn engine(stage: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::EngineUnavailable {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`PipelineError::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// The rendition name this error is attributed to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::EncodeFailed { stage, .. }
            | PipelineError::EngineUnavailable { stage, .. }
            | PipelineError::Cancelled { stage } => Some(stage),
            _ => None,
        }
    }
}

/// Result alias using [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;
