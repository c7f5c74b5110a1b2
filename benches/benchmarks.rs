//! Benchmarks for chunk compression, decoding and row addressing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fvec_rs::{Key, NewChunk, Vector};

/// Prices with two decimal places: compresses to a scaled encoding.
fn generate_decimals(size: usize) -> Vec<(i64, i32)> {
    (0..size)
        .map(|i| (10_000 + ((i as f64 * 0.001).sin() * 5_000.0) as i64, -2))
        .collect()
}

/// Doubles with no short decimal form: stored as single precision.
fn generate_floats(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| (i as f64).sqrt() * std::f64::consts::E)
        .collect()
}

fn fill(rows: &[(i64, i32)]) -> NewChunk {
    let mut nc = NewChunk::with_capacity(0, rows.len());
    for &(m, e) in rows {
        nc.append(m, e);
    }
    nc
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for size in [1000, 10000, 100000] {
        let rows = generate_decimals(size);
        let nc = fill(&rows);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &nc, |b, nc| {
            b.iter(|| black_box(nc.clone()).compress())
        });
    }

    group.finish();
}

fn bench_compress_float(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_float");

    for size in [1000, 10000, 100000] {
        let mut nc = NewChunk::with_capacity(0, size);
        for v in generate_floats(size) {
            nc.append_f64(v).unwrap();
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &nc, |b, nc| {
            b.iter(|| black_box(nc.clone()).compress())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [1000, 10000, 100000] {
        let chunk = fill(&generate_decimals(size)).compress();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &chunk, |b, chunk| {
            b.iter(|| black_box(chunk).iter_f64().sum::<f64>())
        });
    }

    group.finish();
}

fn bench_elem2chunk_idx(c: &mut Criterion) {
    let mut group = c.benchmark_group("elem2chunk_idx");

    for n_chunks in [16u64, 1024, 65536] {
        let espc: Vec<u64> = (0..=n_chunks).map(|c| c * 1000 + c % 7).collect();
        let vec = Vector::new(Key::vec("bench"), espc, f64::NAN, 0.0, 0.0).unwrap();
        let len = vec.len();

        group.bench_with_input(BenchmarkId::from_parameter(n_chunks), &vec, |b, vec| {
            let mut i = 0u64;
            b.iter(|| {
                i = (i + 7919) % len;
                vec.elem2chunk_idx(black_box(i))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compress,
    bench_compress_float,
    bench_decode,
    bench_elem2chunk_idx
);
criterion_main!(benches);
