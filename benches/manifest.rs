//! Benchmark master playlist generation and parse-back.
//!
//! Covers the built-in three-tier ladder and a synthetic 12-tier ladder to
//! show how generation scales with rendition count.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lf_core::{RenditionLadder, RenditionSpec};

fn wide_ladder() -> Vec<RenditionSpec> {
    let base = RenditionLadder::plan().renditions()[1].clone();
    (0..12u32)
        .map(|i| RenditionSpec {
            name: format!("tier{i:02}"),
            width: 1280 - i * 64,
            height: 720 - i * 36,
            ..base.clone()
        })
        .collect()
}

fn bench_manifest(c: &mut Criterion) {
    let plan = RenditionLadder::plan();
    let wide = wide_ladder();
    let text = lf_media::build_master_manifest(&wide);

    let mut group = c.benchmark_group("manifest");

    group.bench_function("build_default_ladder", |b| {
        b.iter(|| lf_media::build_master_manifest(black_box(plan.renditions())));
    });

    group.bench_function("build_12_tiers", |b| {
        b.iter(|| lf_media::build_master_manifest(black_box(&wide)));
    });

    group.bench_function("parse_12_tiers", |b| {
        b.iter(|| lf_media::parse_master_playlist(black_box(&text)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_manifest);
criterion_main!(benches);
