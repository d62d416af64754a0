//! The encoding engine boundary.
//!
//! The orchestrator only ever sees [`Encoder`]: one call per rendition with a
//! complete argument list, answered with the engine's exit code. Tests
//! substitute fakes; production uses [`FfmpegEncoder`].

use std::collections::VecDeque;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use lf_core::{PipelineError, Result};

use crate::command::{RunOutcome, ToolCommand};
use crate::tools::ToolRegistry;

/// Number of trailing stderr lines kept for failure diagnostics.
const STDERR_TAIL: usize = 20;

/// An external encoding engine.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run one encode for `stage` (the rendition name) with `args`, which
    /// excludes the program name.
    ///
    /// Returns the engine's exit code; 0 means success. Returns
    /// [`PipelineError::EngineUnavailable`] if the engine cannot be started
    /// and [`PipelineError::Cancelled`] if `cancel` stopped it mid-run.
    async fn encode(
        &self,
        stage: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<i32>;
}

/// Encoder that runs the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use the ffmpeg found by `tools`.
    pub fn from_registry(tools: &ToolRegistry) -> Result<Self> {
        Ok(Self::new(tools.require("ffmpeg")?))
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(
        &self,
        stage: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<i32> {
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL);

        let outcome = ToolCommand::new(self.program.clone())
            .args(args.iter().cloned())
            .run_streaming(cancel, |line| {
                tracing::trace!(target: "ladderforge::ffmpeg", "[{stage}] {line}");
                if tail.len() == STDERR_TAIL {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            })
            .await
            .map_err(|e| {
                let program = self.program.display();
                PipelineError::engine(stage, format!("failed to run {program}: {e}"))
            })?;

        match outcome {
            RunOutcome::Cancelled => Err(PipelineError::Cancelled {
                stage: stage.to_string(),
            }),
            RunOutcome::Exited(status) => {
                // Killed by a signal: no exit code, report as -1.
                let code = status.code().unwrap_or(-1);
                if code != 0 {
                    for line in &tail {
                        tracing::error!(target: "ladderforge::ffmpeg", "[{stage}] {line}");
                    }
                }
                Ok(code)
            }
        }
    }
}
