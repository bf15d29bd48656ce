//! Backend comparison benchmark.
//!
//! Compares the runtime dispatcher against the explicitly pinned kernels.
//! Validates the cost of dispatch and the speedup of each SIMD target.

#![allow(missing_docs)]
#![allow(unsafe_code)]
#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use highwayhash::engine::caps;
use highwayhash::kernels;
use std::hint::black_box;

const KEY: [u64; 4] = [
    0x0706_0504_0302_0100,
    0x0F0E_0D0C_0B0A_0908,
    0x1716_1514_1312_1110,
    0x1F1E_1D1C_1B1A_1918,
];

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("Backends");

    // Scenarios:
    // - Small (7B): dispatch overhead vs. the tail path
    // - Medium (1KB): L1-hot main loop
    // - Large (256KB): bulk throughput
    let sizes = [7, 1024, 256 * 1024];

    for size in sizes {
        let input = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        // 1. Dispatched (production path).
        group.bench_function(format!("Dispatch ({}) - {size} bytes", highwayhash::active_backend()), |b| {
            b.iter(|| highwayhash::hash64(&KEY, black_box(&input)));
        });

        // 2. Explicit kernels (bypass the dispatcher).
        #[cfg(target_arch = "x86_64")]
        {
            let flags = caps::supported();
            if flags & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
                group.bench_function(format!("AVX2 native - {size} bytes"), |b| {
                    // SAFETY: AVX2 group verified above.
                    b.iter(|| unsafe { kernels::avx2::hash64(&KEY, black_box(&input)) });
                });
            }
            if flags & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
                group.bench_function(format!("SSE4.1 native - {size} bytes"), |b| {
                    // SAFETY: SSE4.1 group verified above.
                    b.iter(|| unsafe { kernels::sse41::hash64(&KEY, black_box(&input)) });
                });
            }
        }

        // 3. Portable reference.
        group.bench_function(format!("Portable - {size} bytes"), |b| {
            b.iter(|| kernels::portable::hash64(&KEY, black_box(&input)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
