//! Public one-shot API.

use crate::engine::dispatcher;
use crate::types::Key;
use subtle::ConstantTimeEq;

// =============================================================================
// HASHING
// =============================================================================

/// Compute the 64-bit HighwayHash of `bytes` under `key`.
///
/// HighwayHash is a keyed pseudo-random function: without knowledge of the
/// key, multi-collisions are infeasible to construct, which makes it safe for
/// hash tables holding attacker-controlled data. It is not a cryptographic
/// hash.
///
/// # Example
/// ```rust
/// let key = [1u64, 2, 3, 4];
/// let hash = highwayhash::hash64(&key, b"hello");
/// assert_eq!(hash, highwayhash::hash64(&key, b"hello"));
/// ```
#[must_use]
#[inline]
pub fn hash64(key: &Key, bytes: &[u8]) -> u64 {
    (dispatcher::best_kernel().hash64)(key, bytes)
}

/// Compute the 128-bit HighwayHash of `bytes` under `key`.
///
/// Lanes are returned little-endian-first: `result[0]` is the low half.
#[must_use]
#[inline]
pub fn hash128(key: &Key, bytes: &[u8]) -> [u64; 2] {
    (dispatcher::best_kernel().hash128)(key, bytes)
}

/// Compute the 256-bit HighwayHash of `bytes` under `key`.
#[must_use]
#[inline]
pub fn hash256(key: &Key, bytes: &[u8]) -> [u64; 4] {
    (dispatcher::best_kernel().hash256)(key, bytes)
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// Verify a 64-bit digest in constant time.
///
/// Use this instead of `==` when `expected` came from an untrusted party and
/// the key must not leak through timing.
#[must_use]
pub fn verify64(key: &Key, bytes: &[u8], expected: u64) -> bool {
    hash64(key, bytes).ct_eq(&expected).into()
}

/// Verify a 256-bit digest in constant time.
#[must_use]
pub fn verify256(key: &Key, bytes: &[u8], expected: &[u64; 4]) -> bool {
    let computed = hash256(key, bytes);
    let mut ok = subtle::Choice::from(1);
    for (c, e) in computed.iter().zip(expected.iter()) {
        ok &= c.ct_eq(e);
    }
    ok.into()
}

// =============================================================================
// TESTS
// =============================================================================
