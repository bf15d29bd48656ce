//! Hardware dispatcher.
//!
//! Selects the fastest available kernel (AVX2, SSE4.1, or portable) for the
//! current CPU. Selection reads the memoized capability bits, so the cost per
//! call is two compares; the SIMD kernels are only ever entered through the
//! wrappers below, after their feature group has been verified.

use crate::engine::caps;
use crate::kernels;
use crate::types::Kernel;
#[cfg(target_arch = "x86_64")]
use crate::types::Key;

// =============================================================================
// DISPATCHER
// =============================================================================

/// Returns the entry table for the best kernel supported by this CPU.
///
/// Never fails: the portable kernel is always admissible.
#[must_use]
pub fn best_kernel() -> &'static Kernel {
    let flags = caps::supported();

    #[cfg(target_arch = "x86_64")]
    {
        if flags & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
            return &AVX2_KERNEL;
        }
        if flags & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
            return &SSE41_KERNEL;
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = flags;

    &PORTABLE_KERNEL
}

static PORTABLE_KERNEL: Kernel = Kernel {
    name: "portable",
    hash64: kernels::portable::hash64,
    hash128: kernels::portable::hash128,
    hash256: kernels::portable::hash256,
};

#[cfg(target_arch = "x86_64")]
static SSE41_KERNEL: Kernel = Kernel {
    name: "sse41",
    hash64: sse41_hash64,
    hash128: sse41_hash128,
    hash256: sse41_hash256,
};

#[cfg(target_arch = "x86_64")]
static AVX2_KERNEL: Kernel = Kernel {
    name: "avx2",
    hash64: avx2_hash64,
    hash128: avx2_hash128,
    hash256: avx2_hash256,
};

// =============================================================================
// WRAPPERS
// =============================================================================

#[cfg(target_arch = "x86_64")]
#[inline]
fn sse41_hash64(key: &Key, bytes: &[u8]) -> u64 {
    // SAFETY: only reachable through `best_kernel` after the SSE4.1 group
    // check.
    unsafe { kernels::sse41::hash64(key, bytes) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn sse41_hash128(key: &Key, bytes: &[u8]) -> [u64; 2] {
    // SAFETY: as above.
    unsafe { kernels::sse41::hash128(key, bytes) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn sse41_hash256(key: &Key, bytes: &[u8]) -> [u64; 4] {
    // SAFETY: as above.
    unsafe { kernels::sse41::hash256(key, bytes) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn avx2_hash64(key: &Key, bytes: &[u8]) -> u64 {
    // SAFETY: only reachable through `best_kernel` after the AVX2 group
    // check.
    unsafe { kernels::avx2::hash64(key, bytes) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn avx2_hash128(key: &Key, bytes: &[u8]) -> [u64; 2] {
    // SAFETY: as above.
    unsafe { kernels::avx2::hash128(key, bytes) }
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn avx2_hash256(key: &Key, bytes: &[u8]) -> [u64; 4] {
    // SAFETY: as above.
    unsafe { kernels::avx2::hash256(key, bytes) }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_kernel_matches_caps() {
        let flags = caps::supported();
        let kernel = best_kernel();
        #[cfg(target_arch = "x86_64")]
        {
            if flags & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
                assert_eq!(kernel.name, "avx2");
            } else if flags & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
                assert_eq!(kernel.name, "sse41");
            } else {
                assert_eq!(kernel.name, "portable");
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            let _ = flags;
            assert_eq!(kernel.name, "portable");
        }
    }

    #[test]
    fn dispatched_matches_portable() {
        let key = [11, 13, 17, 19];
        let data: Vec<u8> = (0..200u16).map(|i| i as u8).collect();
        let kernel = best_kernel();
        assert_eq!(
            (kernel.hash64)(&key, &data),
            kernels::portable::hash64(&key, &data)
        );
    }
}
