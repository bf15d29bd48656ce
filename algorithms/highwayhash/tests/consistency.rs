//! Cross-backend consistency & regression tests.
//!
//! The three kernels must be bit-identical for every input length and every
//! output width; the dispatcher must pick a kernel consistent with the
//! detected capabilities; repeated calls must be idempotent.

#![allow(clippy::unwrap_used)]

use highwayhash::engine::caps;
use highwayhash::kernels::portable;

/// Key used by the reference test vectors: byte i of the key block is i.
const TEST_KEY: [u64; 4] = [
    0x0706_0504_0302_0100,
    0x0F0E_0D0C_0B0A_0908,
    0x1716_1514_1312_1110,
    0x1F1E_1D1C_1B1A_1918,
];

fn test_input(n: usize) -> Vec<u8> {
    (0..n).map(|i| i as u8).collect()
}

// =============================================================================
// CROSS-BACKEND EQUIVALENCE
// =============================================================================

#[test]
fn backends_agree_on_every_length() {
    let data = test_input(1024);

    for n in 0..=1024 {
        let input = &data[..n];
        let h64 = portable::hash64(&TEST_KEY, input);
        let h128 = portable::hash128(&TEST_KEY, input);
        let h256 = portable::hash256(&TEST_KEY, input);

        // The dispatched kernel (whatever it is on this host) must match the
        // scalar reference.
        assert_eq!(highwayhash::hash64(&TEST_KEY, input), h64, "dispatch 64, n={n}");
        assert_eq!(highwayhash::hash128(&TEST_KEY, input), h128, "dispatch 128, n={n}");
        assert_eq!(highwayhash::hash256(&TEST_KEY, input), h256, "dispatch 256, n={n}");

        #[cfg(target_arch = "x86_64")]
        {
            use highwayhash::kernels::{avx2, sse41};

            let flags = caps::supported();
            if flags & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
                // SAFETY: SSE4.1 group verified above.
                unsafe {
                    assert_eq!(sse41::hash64(&TEST_KEY, input), h64, "sse41 64, n={n}");
                    assert_eq!(sse41::hash128(&TEST_KEY, input), h128, "sse41 128, n={n}");
                    assert_eq!(sse41::hash256(&TEST_KEY, input), h256, "sse41 256, n={n}");
                }
            }
            if flags & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
                // SAFETY: AVX2 group verified above.
                unsafe {
                    assert_eq!(avx2::hash64(&TEST_KEY, input), h64, "avx2 64, n={n}");
                    assert_eq!(avx2::hash128(&TEST_KEY, input), h128, "avx2 128, n={n}");
                    assert_eq!(avx2::hash256(&TEST_KEY, input), h256, "avx2 256, n={n}");
                }
            }
        }
    }
}

// =============================================================================
// SCENARIO GRID
// =============================================================================

#[test]
fn tail_path_scenarios() {
    // n = 0: no tail. n = 7: short-tail branch. n = 16: long-tail branch with
    // an empty masked region. n = 31: maximum residue including the 3-byte
    // gather. n = 32: whole-packet input, tail path not invoked. n = 1024:
    // 32-packet main loop, no tail.
    let data = test_input(1024);

    for n in [0usize, 7, 16, 31, 32, 1024] {
        let input = &data[..n];
        let h64 = highwayhash::hash64(&TEST_KEY, input);
        let h128 = highwayhash::hash128(&TEST_KEY, input);
        let h256 = highwayhash::hash256(&TEST_KEY, input);

        assert_eq!(h64, portable::hash64(&TEST_KEY, input), "n={n}");
        assert_eq!(h128, portable::hash128(&TEST_KEY, input), "n={n}");
        assert_eq!(h256, portable::hash256(&TEST_KEY, input), "n={n}");

        // Basic quality: none of the widths collapse to zero.
        assert_ne!(h256, [0u64; 4], "zero 256-bit digest at n={n}");
    }
    assert_ne!(highwayhash::hash64(&TEST_KEY, &data[..1024]), 0);
}

#[test]
fn whole_packet_input_is_distinct() {
    // A 32-byte input skips the tail entirely; it must still differ from the
    // empty input and from neighbors that do take the tail path.
    let data = test_input(64);
    let h32 = highwayhash::hash64(&TEST_KEY, &data[..32]);
    assert_ne!(h32, highwayhash::hash64(&TEST_KEY, &data[..0]));
    assert_ne!(h32, highwayhash::hash64(&TEST_KEY, &data[..31]));
    assert_ne!(h32, highwayhash::hash64(&TEST_KEY, &data[..64]));
}

// =============================================================================
// IDEMPOTENCE & DISPATCH
// =============================================================================

#[test]
fn repeated_calls_are_idempotent() {
    let data = test_input(333);
    let h64 = highwayhash::hash64(&TEST_KEY, &data);
    let h128 = highwayhash::hash128(&TEST_KEY, &data);
    let h256 = highwayhash::hash256(&TEST_KEY, &data);
    for _ in 0..8 {
        assert_eq!(highwayhash::hash64(&TEST_KEY, &data), h64);
        assert_eq!(highwayhash::hash128(&TEST_KEY, &data), h128);
        assert_eq!(highwayhash::hash256(&TEST_KEY, &data), h256);
    }
}

#[test]
fn active_backend_is_consistent_with_caps() {
    let name = highwayhash::active_backend();
    let flags = caps::supported();
    if flags & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
        assert_eq!(name, "avx2");
    } else if flags & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
        assert_eq!(name, "sse41");
    } else {
        assert_eq!(name, "portable");
    }
}

#[test]
fn concurrent_first_use_agrees() {
    // Hash from many threads at once; the memoized detection must hand every
    // thread the same kernel and therefore the same digests.
    let data = test_input(100);
    let expected = highwayhash::hash64(&TEST_KEY, &data);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let data = data.clone();
            std::thread::spawn(move || highwayhash::hash64(&TEST_KEY, &data))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// =============================================================================
// KEY SENSITIVITY
// =============================================================================

#[test]
fn distinct_keys_are_independent() {
    let data = test_input(96);
    let mut other_key = TEST_KEY;
    other_key[0] ^= 1;
    assert_ne!(
        highwayhash::hash64(&TEST_KEY, &data),
        highwayhash::hash64(&other_key, &data)
    );
}
