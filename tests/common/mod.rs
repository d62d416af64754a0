//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a temporary output base and a
//! [`ScriptedEncoder`] that stands in for ffmpeg: it writes a plausible
//! variant playlist and segments where the arguments say, or fails on a
//! chosen rendition.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use lf_av::{log_channel, Encoder, TranscodePipeline};
use lf_core::{EncodePolicy, RenditionLadder, Result};

/// Encoder fake driven by the argument list it receives.
#[derive(Default)]
pub struct ScriptedEncoder {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    fail_on: Option<(String, i32)>,
}

impl ScriptedEncoder {
    pub fn failing_on(stage: &str, code: i32) -> Self {
        Self {
            fail_on: Some((stage.to_string(), code)),
            ..Self::default()
        }
    }

    /// Rendition names in call order.
    pub fn stages(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    /// Argument list of the call for `stage`.
    pub fn args_for(&self, stage: &str) -> Option<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == stage)
            .map(|(_, a)| a.clone())
    }
}

#[async_trait]
impl Encoder for ScriptedEncoder {
    async fn encode(
        &self,
        stage: &str,
        args: &[String],
        _cancel: &CancellationToken,
    ) -> Result<i32> {
        self.calls
            .lock()
            .unwrap()
            .push((stage.to_string(), args.to_vec()));

        if let Some((ref name, code)) = self.fail_on {
            if name == stage {
                return Ok(code);
            }
        }

        let pattern = value_after(args, "-hls_segment_filename");
        let playlist = PathBuf::from(args.last().unwrap());
        let mut text = String::from(
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:6\n#EXT-X-PLAYLIST-TYPE:VOD\n",
        );
        for i in 0..3 {
            let segment = PathBuf::from(pattern.replace("%03d", &format!("{i:03}")));
            fs::write(&segment, b"\x47fake-ts").unwrap();
            let file = segment.file_name().unwrap().to_string_lossy();
            text.push_str(&format!("#EXTINF:6.000000,\n{file}\n"));
        }
        text.push_str("#EXT-X-ENDLIST\n");
        fs::write(&playlist, text).unwrap();

        Ok(0)
    }
}

/// Value following `flag` in an argument list.
pub fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
    let pos = args.iter().position(|a| a == flag).unwrap();
    &args[pos + 1]
}

/// Temporary output base plus a pipeline over a [`ScriptedEncoder`].
pub struct TestHarness {
    pub base: TempDir,
    pub encoder: Arc<ScriptedEncoder>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_encoder(ScriptedEncoder::default())
    }

    pub fn with_encoder(encoder: ScriptedEncoder) -> Self {
        Self {
            base: tempfile::tempdir().unwrap(),
            encoder: Arc::new(encoder),
        }
    }

    pub fn base(&self) -> &Path {
        self.base.path()
    }

    pub fn pipeline(&self) -> TranscodePipeline {
        TranscodePipeline::new(self.encoder.clone(), EncodePolicy::default(), self.base())
    }

    /// Run `ladder` into a root called `run_name`, collecting log lines.
    pub async fn run(
        &self,
        ladder: &RenditionLadder,
        run_name: &str,
    ) -> (Result<PathBuf>, Vec<String>) {
        let (sink, mut rx) = log_channel();
        let result = self
            .pipeline()
            .run_named(
                Path::new("/media/source.mov"),
                ladder,
                &sink,
                &CancellationToken::new(),
                run_name,
            )
            .await;
        drop(sink);

        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        (result, lines)
    }
}
