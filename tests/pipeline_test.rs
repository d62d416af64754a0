//! Pipeline integration tests
//!
//! Whole runs against the scripted encoder: directory layout, manifest
//! contents, abort semantics and root naming.

mod common;

use std::fs;

use assert_matches::assert_matches;
use chrono::{Local, TimeZone};
use common::{value_after, ScriptedEncoder, TestHarness};
use lf_core::{run_dir_name, PipelineError, RenditionLadder};

/// Default ladder, 16:9 1080p source.
#[tokio::test]
async fn test_default_ladder_produces_complete_run() {
    let h = TestHarness::new();
    let ladder = RenditionLadder::plan();

    let (result, lines) = h.run(&ladder, "2026-03-09-10-00-00").await;
    let root = result.unwrap();

    assert_eq!(root, h.base().join("2026-03-09-10-00-00"));

    let mut entries: Vec<String> = fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["1080p", "480p", "720p", "manifest.m3u8"]);

    for name in ["1080p", "720p", "480p"] {
        let dir = root.join(name);
        assert!(dir.join("index.m3u8").is_file());
        let segments = fs::read_dir(&dir)
            .unwrap()
            .filter(|e| {
                let n = e.as_ref().unwrap().file_name().to_string_lossy().to_string();
                n.starts_with("segment_") && n.ends_with(".ts")
            })
            .count();
        assert!(segments >= 1, "{name} has no segments");
    }

    let manifest = fs::read_to_string(root.join("manifest.m3u8")).unwrap();
    assert_eq!(
        manifest,
        "#EXTM3U\n\
         #EXT-X-VERSION:3\n\
         #EXT-X-STREAM-INF:BANDWIDTH=6000000,AVERAGE-BANDWIDTH=5000000,RESOLUTION=1920x1080,CODECS=\"avc1.640028,mp4a.40.2\"\n\
         1080p/index.m3u8\n\
         #EXT-X-STREAM-INF:BANDWIDTH=3500000,AVERAGE-BANDWIDTH=2800000,RESOLUTION=1280x720,CODECS=\"avc1.64001F,mp4a.40.2\"\n\
         720p/index.m3u8\n\
         #EXT-X-STREAM-INF:BANDWIDTH=2000000,AVERAGE-BANDWIDTH=1400000,RESOLUTION=854x480,CODECS=\"avc1.64001E,mp4a.40.2\"\n\
         480p/index.m3u8\n"
    );

    assert!(lines.last().unwrap().ends_with("manifest.m3u8"));
}

#[tokio::test]
async fn test_manifest_parses_back_in_ladder_order() {
    let h = TestHarness::new();
    let ladder = RenditionLadder::plan();

    let (result, _) = h.run(&ladder, "run").await;
    let root = result.unwrap();

    let master = lf_media::read_master_manifest(&root).unwrap();
    assert_eq!(master.version, 3);
    assert_eq!(master.variants.len(), ladder.len());
    for (variant, spec) in master.variants.iter().zip(&ladder) {
        assert_eq!(variant.bandwidth, spec.bandwidth);
        assert_eq!(variant.average_bandwidth, Some(spec.average_bandwidth));
        assert_eq!(variant.resolution, Some((spec.width, spec.height)));
        assert_eq!(variant.codecs, spec.codecs);
        assert_eq!(variant.uri, format!("{}/index.m3u8", spec.name));
    }
}

#[tokio::test]
async fn test_manifest_uris_survive_moving_the_root() {
    let h = TestHarness::new();
    let (result, _) = h.run(&RenditionLadder::plan(), "run").await;
    let root = result.unwrap();

    let moved = h.base().join("archive").join("moved-run");
    fs::create_dir_all(moved.parent().unwrap()).unwrap();
    fs::rename(&root, &moved).unwrap();

    let master = lf_media::read_master_manifest(&moved).unwrap();
    for variant in &master.variants {
        assert!(!variant.uri.starts_with('/'));
        assert!(moved.join(&variant.uri).is_file(), "{} dangling", variant.uri);
    }
}

#[tokio::test]
async fn test_failure_at_second_rendition_aborts_run() {
    let h = TestHarness::with_encoder(ScriptedEncoder::failing_on("720p", 187));

    let (result, lines) = h.run(&RenditionLadder::plan(), "run").await;

    assert_matches!(
        result,
        Err(PipelineError::EncodeFailed { ref stage, code: 187 }) if stage == "720p"
    );
    assert_eq!(h.encoder.stages(), vec!["1080p", "720p"]);

    let root = h.base().join("run");
    assert!(!root.join("manifest.m3u8").exists());
    assert!(!root.join("480p").exists());
    assert!(lines.iter().any(|l| l == "720p failed with exit code 187"));
    assert!(!lines.iter().any(|l| l.contains("480p")));
}

#[tokio::test]
async fn test_failure_on_first_rendition_attempts_nothing_else() {
    let h = TestHarness::with_encoder(ScriptedEncoder::failing_on("1080p", 1));

    let (result, _) = h.run(&RenditionLadder::plan(), "run").await;

    assert_matches!(result, Err(PipelineError::EncodeFailed { .. }));
    assert_eq!(h.encoder.stages(), vec!["1080p"]);
    assert!(lf_core::list_completed_runs(h.base()).unwrap().is_empty());
}

#[tokio::test]
async fn test_encoder_receives_exact_argument_list() {
    let h = TestHarness::new();
    let (result, lines) = h.run(&RenditionLadder::plan(), "run").await;
    let root = result.unwrap();

    let args = h.encoder.args_for("480p").unwrap();
    assert_eq!(value_after(&args, "-i"), "/media/source.mov");
    assert_eq!(
        value_after(&args, "-vf"),
        "format=yuv420p,scale=w=854:h=480:force_original_aspect_ratio=decrease,pad=854:480:(ow-iw)/2:(oh-ih)/2"
    );
    assert_eq!(value_after(&args, "-b:v"), "1400k");
    assert_eq!(value_after(&args, "-maxrate"), "1498k");
    assert_eq!(value_after(&args, "-bufsize"), "2100k");
    assert_eq!(
        value_after(&args, "-hls_segment_filename"),
        root.join("480p/segment_%03d.ts").to_string_lossy()
    );

    // The echoed command line matches what the encoder got.
    assert!(lines.contains(&args.join(" ")));
}

#[tokio::test]
async fn test_distinct_start_times_get_distinct_roots() {
    let h = TestHarness::new();
    let sd = RenditionLadder::plan().renditions()[2].clone();
    let ladder = RenditionLadder::new(vec![sd]).unwrap();

    let t1 = Local.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap();
    let t2 = Local.with_ymd_and_hms(2026, 3, 9, 10, 0, 1).unwrap();
    let (n1, n2) = (run_dir_name(&t1), run_dir_name(&t2));
    assert_ne!(n1, n2);

    let (r1, _) = h.run(&ladder, &n1).await;
    let (r2, _) = h.run(&ladder, &n2).await;
    assert_ne!(r1.unwrap(), r2.unwrap());

    let runs = lf_core::list_completed_runs(h.base()).unwrap();
    let names: Vec<&str> = runs.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec![n2.as_str(), n1.as_str()]);
}

#[tokio::test]
async fn test_spawned_run_can_be_drained_line_by_line() {
    let h = TestHarness::new();
    let mut handle = h
        .pipeline()
        .spawn("/media/source.mov".into(), RenditionLadder::plan());

    let mut lines = Vec::new();
    while let Some(line) = handle.next_line().await {
        lines.push(line);
    }
    let root = handle.finish().await.unwrap();

    assert!(root.join("manifest.m3u8").is_file());
    let order: Vec<&String> = lines.iter().filter(|l| l.ends_with(" done")).collect();
    assert_eq!(order, vec!["1080p done", "720p done", "480p done"]);
}
