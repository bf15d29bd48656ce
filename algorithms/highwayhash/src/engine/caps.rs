//! CPU capability detection.
//!
//! `supported()` returns a bitmask of the instruction-set extensions usable
//! by this process. Detection runs once: the first caller performs CPUID (and
//! XGETBV, when the OS advertises XSAVE) and publishes the bits with a
//! release store; concurrent callers that lose the race spin on an acquire
//! load. Bit 0 is always set so "no extensions detected" is distinguishable
//! from "not yet detected".
//!
//! CPUID reports what the CPU supports, not what the OS allows. Without
//! verifying XCR0, using XMM/YMM registers on an OS that does not save them
//! across context switches would fault, so the SSE and AVX families are
//! cleared when the corresponding XCR0 state bits are absent.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

// =============================================================================
// FEATURE BITS
// =============================================================================

/// Always set once detection ran.
pub const INITIALIZED: u64 = 1;

pub const SSE: u64 = 1 << 1;
pub const SSE2: u64 = 1 << 2;
pub const SSE3: u64 = 1 << 3;
pub const SSSE3: u64 = 1 << 4;
pub const SSE41: u64 = 1 << 5;
pub const SSE42: u64 = 1 << 6;
pub const POPCNT: u64 = 1 << 7;
pub const AVX: u64 = 1 << 8;
pub const AVX2: u64 = 1 << 9;
pub const FMA: u64 = 1 << 10;
pub const LZCNT: u64 = 1 << 11;
pub const BMI1: u64 = 1 << 12;
pub const BMI2: u64 = 1 << 13;

/// Everything the AVX2 kernels are compiled against.
pub const GROUP_AVX2: u64 = AVX | AVX2 | FMA | LZCNT | BMI1 | BMI2;

/// Everything the SSE4.1 kernels are compiled against.
pub const GROUP_SSE41: u64 = SSE | SSE2 | SSE3 | SSSE3 | SSE41 | POPCNT;

// =============================================================================
// MEMOIZATION
// =============================================================================

// 0 iff not yet initialized.
static SUPPORTED: AtomicU64 = AtomicU64::new(0);

// The first thread to increment this runs detection; everyone else waits.
static INIT_RACE: AtomicU32 = AtomicU32::new(0);

/// Bitmask of extensions supported by this CPU and OS.
///
/// Thread-safe; detection runs at most once per process. Detection has no
/// failure mode: on CPUs (or architectures) without any of the extensions the
/// result is just [`INITIALIZED`], and the portable kernel serves every call.
#[must_use]
pub fn supported() -> u64 {
    let flags = SUPPORTED.load(Ordering::Acquire);
    if flags != 0 {
        return flags;
    }

    if INIT_RACE.fetch_add(1, Ordering::AcqRel) != 0 {
        // Another thread won the race and must not be raced with CPUID;
        // wait for it to publish.
        loop {
            let flags = SUPPORTED.load(Ordering::Acquire);
            if flags != 0 {
                return flags;
            }
            core::hint::spin_loop();
        }
    }

    let flags = detect();
    SUPPORTED.store(flags, Ordering::Release);
    flags
}

// =============================================================================
// DETECTION
// =============================================================================

#[inline]
fn bit(reg: u32, index: u32) -> bool {
    reg & (1 << index) != 0
}

#[cfg(target_arch = "x86_64")]
fn detect() -> u64 {
    use core::arch::x86_64::{__cpuid_count, _xgetbv};

    let mut flags = INITIALIZED;

    // SAFETY: CPUID is unconditionally available on x86_64.
    let max_level = unsafe { __cpuid_count(0, 0) }.eax;

    // Standard feature flags (leaf 1).
    // SAFETY: as above.
    let cpuid1 = unsafe { __cpuid_count(1, 0) };
    if bit(cpuid1.edx, 25) {
        flags |= SSE;
    }
    if bit(cpuid1.edx, 26) {
        flags |= SSE2;
    }
    if bit(cpuid1.ecx, 0) {
        flags |= SSE3;
    }
    if bit(cpuid1.ecx, 9) {
        flags |= SSSE3;
    }
    if bit(cpuid1.ecx, 19) {
        flags |= SSE41;
    }
    if bit(cpuid1.ecx, 20) {
        flags |= SSE42;
    }
    if bit(cpuid1.ecx, 23) {
        flags |= POPCNT;
    }
    if bit(cpuid1.ecx, 12) {
        flags |= FMA;
    }
    if bit(cpuid1.ecx, 28) {
        flags |= AVX;
    }
    let has_osxsave = bit(cpuid1.ecx, 27);

    // Extended feature flags (leaf 7, subleaf 0).
    if max_level >= 7 {
        // SAFETY: as above.
        let cpuid7 = unsafe { __cpuid_count(7, 0) };
        if bit(cpuid7.ebx, 3) {
            flags |= BMI1;
        }
        if bit(cpuid7.ebx, 5) {
            flags |= AVX2;
        }
        if bit(cpuid7.ebx, 8) {
            flags |= BMI2;
        }
    }

    // AMD-originated flags (leaf 0x80000001).
    // SAFETY: as above.
    let cpuid_ext = unsafe { __cpuid_count(0x8000_0001, 0) };
    if bit(cpuid_ext.ecx, 5) {
        flags |= LZCNT;
    }

    if has_osxsave {
        // SAFETY: XGETBV requires OSXSAVE, checked above.
        let xcr0 = unsafe { _xgetbv(0) };
        // XMM state.
        if xcr0 & 0x2 == 0 {
            flags &= !(SSE | SSE2 | SSE3 | SSSE3 | SSE41 | SSE42 | AVX | AVX2 | FMA);
        }
        // YMM state.
        if xcr0 & 0x4 == 0 {
            flags &= !(AVX | AVX2);
        }
    }

    flags
}

#[cfg(not(target_arch = "x86_64"))]
fn detect() -> u64 {
    INITIALIZED
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_is_initialized_and_stable() {
        let first = supported();
        assert_ne!(first, 0);
        assert_ne!(first & INITIALIZED, 0);
        assert_eq!(supported(), first);
    }

    #[test]
    fn groups_do_not_overlap_initialized() {
        assert_eq!(GROUP_AVX2 & INITIALIZED, 0);
        assert_eq!(GROUP_SSE41 & INITIALIZED, 0);
        assert_eq!(GROUP_AVX2 & GROUP_SSE41, 0);
    }

    #[test]
    fn concurrent_callers_agree() {
        let handles: Vec<std::thread::JoinHandle<u64>> =
            (0..8).map(|_| std::thread::spawn(supported)).collect();
        let expected = supported();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn detection_matches_std() {
        let flags = supported();
        assert_eq!(
            flags & SSE2 != 0,
            std::arch::is_x86_feature_detected!("sse2")
        );
        assert_eq!(
            flags & AVX2 != 0,
            std::arch::is_x86_feature_detected!("avx2")
        );
    }
}
