//! Rendition transcode orchestration.
//!
//! A run creates a timestamp-named root, encodes every rendition of the
//! ladder one after another, and writes the master manifest only once all of
//! them succeeded. The first failure aborts the run: later renditions are not
//! attempted and no manifest is written, so a root without `manifest.m3u8` is
//! never mistaken for playable output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use lf_core::{
    run_dir_name, EncodePolicy, OutputLayout, PipelineError, RenditionLadder, RenditionSpec,
    Result,
};

use crate::args::encode_args;
use crate::encoder::Encoder;
use crate::log::{log_channel, EncodeLog, EncodeLogSink};

/// Drives an [`Encoder`] over a rendition ladder.
#[derive(Clone)]
pub struct TranscodePipeline {
    encoder: Arc<dyn Encoder>,
    policy: EncodePolicy,
    output_base: PathBuf,
}

impl TranscodePipeline {
    /// Runs will create their roots under `output_base`, which must exist.
    pub fn new(
        encoder: Arc<dyn Encoder>,
        policy: EncodePolicy,
        output_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            encoder,
            policy,
            output_base: output_base.into(),
        }
    }

    /// Encode `source` into a new root named after the current local time.
    /// Returns the root on success.
    pub async fn run(
        &self,
        source: &Path,
        ladder: &RenditionLadder,
        log: &EncodeLogSink,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let run_name = run_dir_name(&Local::now());
        self.run_named(source, ladder, log, cancel, &run_name).await
    }

    /// Like [`TranscodePipeline::run`] with an explicit root name.
    pub async fn run_named(
        &self,
        source: &Path,
        ladder: &RenditionLadder,
        log: &EncodeLogSink,
        cancel: &CancellationToken,
        run_name: &str,
    ) -> Result<PathBuf> {
        match self.execute(source, ladder, log, cancel, run_name).await {
            Ok(root) => Ok(root),
            Err(e) => {
                error!("Run {run_name} failed: {e}");
                log.emit(format!("Run failed: {e}"));
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        source: &Path,
        ladder: &RenditionLadder,
        log: &EncodeLogSink,
        cancel: &CancellationToken,
        run_name: &str,
    ) -> Result<PathBuf> {
        ladder.validate()?;

        let layout = OutputLayout::create(&self.output_base, run_name)?;
        info!(
            "Run {run_name}: {} -> {} ({} renditions, encoder={})",
            source.display(),
            layout.root().display(),
            ladder.len(),
            self.policy.video_encoder
        );
        log.emit(format!("Output root: {}", layout.root().display()));

        for spec in ladder {
            // Checked between renditions; the encoder may also stop mid-run.
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled {
                    stage: spec.name.clone(),
                });
            }
            self.encode_rendition(source, spec, &layout, log, cancel).await?;
        }

        let manifest = lf_media::write_master_manifest(layout.root(), ladder.renditions())?;
        info!("Run {run_name} complete: {}", manifest.display());
        log.emit(format!("Master playlist: {}", manifest.display()));

        Ok(layout.into_root())
    }

    async fn encode_rendition(
        &self,
        source: &Path,
        spec: &RenditionSpec,
        layout: &OutputLayout,
        log: &EncodeLogSink,
        cancel: &CancellationToken,
    ) -> Result<()> {
        layout.create_rendition_dir(&spec.name)?;

        let playlist = layout.rendition_playlist(&spec.name);
        log.emit(format!("Encoding {}...", spec.name));
        log.emit(format!("Output: {}", playlist.display()));

        let args = encode_args(source, spec, layout, &self.policy);
        tracing::debug!("{} args: {:?}", spec.name, args);
        log.emit(args.join(" "));

        let code = self.encoder.encode(&spec.name, &args, cancel).await?;
        if code != 0 {
            log.emit(format!("{} failed with exit code {code}", spec.name));
            return Err(PipelineError::encode(&spec.name, code));
        }

        info!("Rendition {} encoded", spec.name);
        log.emit(format!("{} done", spec.name));
        Ok(())
    }

    /// Start a run on a background task and return immediately.
    pub fn spawn(&self, source: PathBuf, ladder: RenditionLadder) -> PipelineHandle {
        let (sink, log) = log_channel();
        let cancel = CancellationToken::new();

        let pipeline = self.clone();
        let token = cancel.clone();
        let task =
            tokio::spawn(async move { pipeline.run(&source, &ladder, &sink, &token).await });

        PipelineHandle { log, cancel, task }
    }
}

/// A run in progress on a background task.
pub struct PipelineHandle {
    log: EncodeLog,
    cancel: CancellationToken,
    task: JoinHandle<Result<PathBuf>>,
}

impl PipelineHandle {
    /// Next progress line; `None` once the run has finished and every line
    /// has been delivered.
    pub async fn next_line(&mut self) -> Option<String> {
        self.log.recv().await
    }

    /// Token that cancels this run. Takes effect before the next rendition,
    /// or immediately if the encoder supports interruption.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Deliver every remaining line to `on_line`, then return the result.
    pub async fn wait(mut self, mut on_line: impl FnMut(String)) -> Result<PathBuf> {
        while let Some(line) = self.log.recv().await {
            on_line(line);
        }
        self.finish().await
    }

    /// Await the result. Undrained lines are discarded.
    pub async fn finish(self) -> Result<PathBuf> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(PipelineError::Cancelled {
                stage: "pipeline task".into(),
            }),
        }
    }
}
