//! Append-only log benchmarks.

use apo_bench::utils::generate_events;
use apo_core::{ApoLog, LogConfig, Meta, Op};
use apo_storage::InMemoryBackend;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

fn memory_log() -> ApoLog {
    ApoLog::with_backend(Box::new(InMemoryBackend::new()), LogConfig::default()).unwrap()
}

/// Benchmark appends to an in-memory log.
///
/// Every append rewrites the footer, so cost grows with the record count.
fn bench_write_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_memory");

    for existing in [0usize, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(existing),
            existing,
            |b, &existing| {
                let log = memory_log();
                for event in generate_events(existing, 64) {
                    log.write(Meta::new(*b"evnt", Op::Insert), &event).unwrap();
                }
                let event = &generate_events(1, 64)[0];

                b.iter(|| {
                    let index = log
                        .write(Meta::new(*b"evnt", Op::Insert), black_box(event))
                        .unwrap();
                    black_box(index);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark appends to a file-backed log, with and without fsync.
fn bench_write_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_file");
    group.sample_size(20);

    for sync in [false, true] {
        let name = if sync { "sync" } else { "flush" };
        group.bench_function(name, |b| {
            let temp_dir = TempDir::new().unwrap();
            let log = ApoLog::open_with_config(
                temp_dir.path().join("bench.apo"),
                LogConfig::new().sync_on_write(sync),
            )
            .unwrap();
            let event = &generate_events(1, 256)[0];

            b.iter(|| {
                let index = log
                    .write(Meta::new(*b"evnt", Op::Insert), black_box(event))
                    .unwrap();
                black_box(index);
            });
        });
    }

    group.finish();
}

/// Benchmark reading a whole log back.
fn bench_read_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_all");

    for count in [100usize, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let log = memory_log();
            for event in generate_events(count, 64) {
                log.write(Meta::new(*b"evnt", Op::Insert), &event).unwrap();
            }

            b.iter(|| {
                let records = log.read_all::<apo_bench::utils::Event>().unwrap();
                black_box(records);
            });
        });
    }

    group.finish();
}

/// Benchmark reopening a populated log file.
fn bench_reopen(c: &mut Criterion) {
    let mut group = c.benchmark_group("reopen");
    group.sample_size(20);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bench.apo");
    {
        let log = ApoLog::open_with_config(&path, LogConfig::new().sync_on_write(false)).unwrap();
        for event in generate_events(5_000, 32) {
            log.write(Meta::new(*b"evnt", Op::Insert), &event).unwrap();
        }
        log.close().unwrap();
    }

    group.bench_function("5000_records", |b| {
        b.iter(|| {
            let log = ApoLog::open(black_box(&path)).unwrap();
            black_box(log.len().unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_write_memory,
    bench_write_file,
    bench_read_all,
    bench_reopen,
);

criterion_main!(benches);
