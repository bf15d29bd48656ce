//! Shared types used across the HighwayHash library.

// =============================================================================
// KEYS & RESULTS
// =============================================================================

/// 256-bit secret key: four 64-bit lanes, lane 0 first.
///
/// The key must remain secret for the hash to defend hash tables against
/// flooding attacks; with a public key HighwayHash is still a high-quality
/// fingerprint, but multi-collisions become computable.
pub type Key = [u64; 4];

/// 128-bit SipHash key: two 64-bit lanes.
pub type SipKey = [u64; 2];

// =============================================================================
// KERNEL INTERFACE
// =============================================================================

/// One-shot 64-bit kernel signature shared by all backends.
pub type Hash64Fn = fn(&Key, &[u8]) -> u64;

/// One-shot 128-bit kernel signature shared by all backends.
pub type Hash128Fn = fn(&Key, &[u8]) -> [u64; 2];

/// One-shot 256-bit kernel signature shared by all backends.
pub type Hash256Fn = fn(&Key, &[u8]) -> [u64; 4];

/// Per-target entry table.
///
/// All hardware backends (AVX2, SSE4.1) and the portable fallback expose the
/// same three entry points so the dispatcher can swap them at runtime. The
/// backends are bit-compatible; only throughput differs.
pub struct Kernel {
    pub name: &'static str,
    pub hash64: Hash64Fn,
    pub hash128: Hash128Fn,
    pub hash256: Hash256Fn,
}
