//! Criterion throughput benchmarks across the public entry points.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use std::hint::black_box;

const KB: usize = 1024;
const MB: usize = 1024 * 1024;

const KEY: [u64; 4] = [
    0x0706_0504_0302_0100,
    0x0F0E_0D0C_0B0A_0908,
    0x1716_1514_1312_1110,
    0x1F1E_1D1C_1B1A_1918,
];

fn random_input(size: usize) -> Vec<u8> {
    let mut input = vec![0u8; size];
    rand::rng().fill(&mut input[..]);
    input
}

// =============================================================================
// BENCHMARK 1: LATENCY
// =============================================================================

/// Hot path latency for small inputs (hash map keys, IDs).
fn bench_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Latency");

    let sizes = [(8, "8B"), (31, "31B"), (64, "64B"), (256, "256B"), (KB, "1KB")];

    for (size, name) in sizes {
        let input = random_input(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| highwayhash::hash64(&KEY, black_box(data)));
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 2: BULK THROUGHPUT
// =============================================================================

fn bench_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-Bulk");

    for (size, name) in [(64 * KB, "64KB"), (MB, "1MB"), (4 * MB, "4MB")] {
        let input = random_input(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("hash64", name), &input, |b, data| {
            b.iter(|| highwayhash::hash64(&KEY, black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("hash256", name), &input, |b, data| {
            b.iter(|| highwayhash::hash256(&KEY, black_box(data)));
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 3: SIPHASH FAMILY
// =============================================================================

fn bench_siphash(c: &mut Criterion) {
    let mut group = c.benchmark_group("3-SipHash");
    let sip_key = [KEY[0], KEY[1]];

    for (size, name) in [(64, "64B"), (KB, "1KB"), (64 * KB, "64KB")] {
        let input = random_input(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("siphash24", name), &input, |b, data| {
            b.iter(|| highwayhash::siphash(&sip_key, black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("siphash13", name), &input, |b, data| {
            b.iter(|| highwayhash::siphash13(&sip_key, black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("siptree", name), &input, |b, data| {
            b.iter(|| highwayhash::siptree_hash(&KEY, black_box(data)));
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 4: STREAMING
// =============================================================================

/// Streaming hasher over a 1 MB input at several fragment sizes; measures
/// the buffering overhead relative to one-shot.
fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("4-Streaming");
    let input = random_input(MB);
    group.throughput(Throughput::Bytes(MB as u64));

    for (chunk, name) in [(64, "64B-chunks"), (4 * KB, "4KB-chunks"), (64 * KB, "64KB-chunks")] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let mut hasher = highwayhash::HighwayHasher::new(&KEY);
                for piece in data.chunks(chunk) {
                    hasher.append(piece);
                }
                hasher.finalize64()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_latency, bench_bulk, bench_siphash, bench_streaming);
criterion_main!(benches);
