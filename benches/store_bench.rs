//! Performance benchmarks for the snapshot codec and the merge reconciler.
//!
//! Run with: cargo bench
//!
//! These benchmarks establish baseline performance metrics for:
//! - Serializing and deserializing whole stores of various sizes
//! - Merging an imported snapshot into a live one
//! - Encoding attachment payloads of various sizes

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use soulpages::journal_core::DateKey;
use soulpages::media::{self, MediaType};
use soulpages::ops::merge;
use soulpages::snapshot::{self, Snapshot};
use soulpages::store::Entry;

/// Builds a snapshot of `days` consecutive pages, each with one small image.
fn build_snapshot(days: i64, start: NaiveDate) -> Snapshot {
    let png = MediaType::new("image/png").expect("valid media type");
    (0..days)
        .map(|offset| {
            let key = DateKey::from_date(start + Duration::days(offset)).expect("valid date");
            let entry = Entry {
                text: format!("Page {} of the benchmark journal.", offset),
                images: vec![media::encode(&[offset as u8; 512], &png)],
                ..Entry::empty()
            };
            (key, entry)
        })
        .collect()
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
}

/// Benchmark serialization of whole stores.
fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_serialize");

    for days in [10, 365, 1000] {
        let snapshot = build_snapshot(days, start_date());
        group.bench_with_input(BenchmarkId::from_parameter(days), &snapshot, |b, snapshot| {
            b.iter(|| {
                let json = snapshot::serialize(black_box(snapshot)).expect("serialize failed");
                black_box(json);
            });
        });
    }

    group.finish();
}

/// Benchmark deserialization, including shape and token validation.
fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_deserialize");

    for days in [10, 365, 1000] {
        let json = snapshot::serialize(&build_snapshot(days, start_date()))
            .expect("serialize failed for benchmark");

        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(days), &json, |b, json| {
            b.iter(|| {
                let parsed = snapshot::deserialize(black_box(json)).expect("deserialize failed");
                black_box(parsed);
            });
        });
    }

    group.finish();
}

/// Benchmark merging a half-overlapping import into a live store.
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for days in [10, 365, 1000] {
        let live = build_snapshot(days, start_date());
        let imported = build_snapshot(days, start_date() + Duration::days(days / 2));

        group.bench_with_input(
            BenchmarkId::from_parameter(days),
            &(live, imported),
            |b, (live, imported)| {
                b.iter(|| {
                    let merged = merge(black_box(live), black_box(imported));
                    black_box(merged);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark attachment encoding with various payload sizes.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let webm = MediaType::new("audio/webm").expect("valid media type");
    let sizes = vec![("1KB", 1024), ("100KB", 100 * 1024), ("1MB", 1024 * 1024)];

    for (name, size) in sizes {
        let data = vec![b'x'; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let token = media::encode(black_box(data), black_box(&webm));
                black_box(token);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_serialize,
    bench_deserialize,
    bench_merge,
    bench_encode
);
criterion_main!(benches);
