//! SipHash family: SipHash-2-4, SipHash-1-3, and the j-lanes SipTreeHash.
//!
//! A second instance of the architecture used by HighwayHash: scalar
//! reference plus a SIMD variant behind the shared capability dispatch, with
//! a length-padded tail packet.

#[cfg(target_arch = "x86_64")]
mod avx2;
mod scalar;

#[doc(hidden)]
pub use scalar::siptree_hash_scalar;
pub use scalar::{SipState, SipState13, SipState24};

#[cfg(target_arch = "x86_64")]
use crate::engine::caps;
use crate::types::{Key, SipKey};

/// SipHash-2-4 of `bytes` under a 128-bit key.
///
/// Matches the Aumasson/Bernstein reference output for every input.
#[must_use]
pub fn siphash(key: &SipKey, bytes: &[u8]) -> u64 {
    scalar::sip_hash::<2, 4>(key, bytes)
}

/// SipHash-1-3 of `bytes`: one compression round per packet, three at
/// finalization. Faster, with a reduced security margin.
#[must_use]
pub fn siphash13(key: &SipKey, bytes: &[u8]) -> u64 {
    scalar::sip_hash::<1, 3>(key, bytes)
}

/// j-lanes SipTreeHash of `bytes` under a 256-bit key: four interleaved
/// SipHash streams reduced by a final SipHash. Dispatches to the AVX2 kernel
/// when available; scalar and SIMD outputs are bit-identical.
#[must_use]
pub fn siptree_hash(key: &Key, bytes: &[u8]) -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        if caps::supported() & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
            // SAFETY: AVX2 group verified above.
            return unsafe { avx2::siptree_hash(key, bytes) };
        }
    }
    scalar::siptree_hash_scalar(key, bytes)
}
