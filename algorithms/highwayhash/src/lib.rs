#![cfg_attr(not(feature = "std"), no_std)]

//! # HighwayHash
//!
//! A fast, keyed pseudo-random function mapping a byte string and a 256-bit
//! secret key to a 64-, 128-, or 256-bit digest, with SipHash-2-4,
//! SipHash-1-3 and SipTreeHash companions. Three bit-identical backends
//! (portable, SSE4.1, AVX2) are selected at runtime.
//!
//! Without knowledge of the key, multi-collisions are infeasible to
//! construct, so the hash is safe for tables holding attacker-controlled
//! data. It is a PRF, not a cryptographic hash.
//!
//! # Usage
//! ```rust
//! let key = [1u64, 2, 3, 4];
//!
//! // 1. One-shot hashing
//! let hash = highwayhash::hash64(&key, b"Performance Matters");
//!
//! // 2. Streaming (fragments of any size)
//! let mut hasher = highwayhash::HighwayHasher::new(&key);
//! hasher.append(b"Performance ");
//! hasher.append(b"Matters");
//! assert_eq!(hasher.finalize64(), hash);
//!
//! // 3. SipHash companions
//! let sip = highwayhash::siphash(&[1, 2], b"Performance Matters");
//! # let _ = sip;
//! ```

// =============================================================================
// MODULES
// =============================================================================

// Re-exported for tests and benchmarks that pin a backend; hidden from docs.
#[doc(hidden)]
pub mod engine;
#[cfg(feature = "std")]
mod ffi;
#[doc(hidden)]
pub mod kernels;
mod oneshot;
pub mod sip;
mod streaming;
mod types;

// =============================================================================
// EXPORTS
// =============================================================================

#[cfg(feature = "std")]
pub use ffi::HighwayHashCat;
pub use oneshot::{hash128, hash256, hash64, verify256, verify64};
pub use sip::{siphash, siphash13, siptree_hash};
pub use streaming::HighwayHasher;
pub use types::{Key, SipKey};

/// Returns the name of the hardware backend currently in use.
#[must_use]
pub fn active_backend() -> &'static str {
    engine::dispatcher::best_kernel().name
}
