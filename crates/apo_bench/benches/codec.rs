//! Codec and buffer benchmarks.

use apo_bench::utils::{generate_events, random_data, Event};
use apo_codec::{decode_value, from_bytes, to_bytes, Buffer, Decoder, Shape};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::SeekFrom;

/// Benchmark encoding primitive and record values.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    group.bench_function("u64", |b| {
        b.iter(|| {
            let result = to_bytes(black_box(&42u64)).unwrap();
            black_box(result);
        });
    });

    group.bench_function("text_short", |b| {
        let value = "hello".to_string();
        b.iter(|| {
            let result = to_bytes(black_box(&value)).unwrap();
            black_box(result);
        });
    });

    for size in [64usize, 1024, 16 * 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("event", size), size, |b, &size| {
            let event = &generate_events(1, size)[0];
            b.iter(|| {
                let result = to_bytes(black_box(event)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark typed and schema-directed decoding.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [64usize, 1024].iter() {
        let event = &generate_events(1, *size)[0];
        let bytes = to_bytes(event).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("typed", size), &bytes, |b, bytes| {
            b.iter(|| {
                let result: Event = from_bytes(black_box(bytes)).unwrap();
                black_box(result);
            });
        });

        let shape = Shape::parse("{id: u64, label: str, body: [u8], parent: ?u64}").unwrap();
        group.bench_with_input(BenchmarkId::new("shape", size), &bytes, |b, bytes| {
            b.iter(|| {
                let mut decoder = Decoder::new(black_box(bytes));
                let result = decode_value(&shape, &mut decoder).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark buffer writes, including overwrite after a seek.
fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");

    group.bench_function("append_1000_u32", |b| {
        b.iter(|| {
            let mut buf = Buffer::with_capacity(4096);
            for i in 0..1000u32 {
                buf.write(&i).unwrap();
            }
            black_box(buf.len());
        });
    });

    group.bench_function("rewrite_head", |b| {
        let body = random_data(4096);
        b.iter(|| {
            let mut buf = Buffer::new();
            buf.write(&body).unwrap();
            buf.seek(SeekFrom::Start(0)).unwrap();
            buf.write(black_box(&7u16)).unwrap();
            black_box(buf.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_buffer);

criterion_main!(benches);
