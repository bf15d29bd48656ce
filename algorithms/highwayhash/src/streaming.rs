//! Streaming ("cat") hasher.
//!
//! Buffers arbitrary-sized fragments in a 32-byte scratch packet, flushing
//! whole packets into the compression state; finalization drains the partial
//! buffer through the length-padded tail path. For any partition of a byte
//! string into fragments, the result is bit-identical to the one-shot hash of
//! the concatenation. No heap allocation.

use crate::engine::caps;
use crate::kernels::constants::PACKET_SIZE;
use crate::kernels::portable::PortableState;
#[cfg(target_arch = "x86_64")]
use crate::kernels::{avx2::Avx2State, sse41::Sse41State};
use crate::types::Key;

#[cfg(feature = "digest-trait")]
use crypto_common::{Key as DigestKey, KeyInit, KeySizeUser};
#[cfg(feature = "digest-trait")]
use digest::typenum::U32;
#[cfg(feature = "digest-trait")]
use digest::{FixedOutput, HashMarker, Output, OutputSizeUser, Reset, Update};

// =============================================================================
// BACKEND STATE
// =============================================================================

/// Target-specific compression state, chosen once at construction.
#[derive(Clone, Copy)]
enum State {
    Portable(PortableState),
    #[cfg(target_arch = "x86_64")]
    Sse41(Sse41State),
    #[cfg(target_arch = "x86_64")]
    Avx2(Avx2State),
}

impl State {
    fn new(key: &Key) -> Self {
        let flags = caps::supported();
        #[cfg(target_arch = "x86_64")]
        {
            if flags & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
                // SAFETY: AVX2 group verified above.
                return State::Avx2(unsafe { Avx2State::new(key) });
            }
            if flags & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
                // SAFETY: SSE4.1 group verified above.
                return State::Sse41(unsafe { Sse41State::new(key) });
            }
        }
        #[cfg(not(target_arch = "x86_64"))]
        let _ = flags;
        State::Portable(PortableState::new(key))
    }

    #[inline]
    fn update(&mut self, packet: &[u8; PACKET_SIZE]) {
        match self {
            State::Portable(s) => s.update(packet),
            // SAFETY: the SIMD variants are only constructed after their
            // feature group was verified in `State::new`.
            #[cfg(target_arch = "x86_64")]
            State::Sse41(s) => unsafe { s.update(packet) },
            #[cfg(target_arch = "x86_64")]
            State::Avx2(s) => unsafe { s.update(packet) },
        }
    }

    fn update_remainder(&mut self, tail: &[u8]) {
        match self {
            State::Portable(s) => s.update_remainder(tail),
            // SAFETY: as in `update`.
            #[cfg(target_arch = "x86_64")]
            State::Sse41(s) => unsafe { s.update_remainder(tail) },
            #[cfg(target_arch = "x86_64")]
            State::Avx2(s) => unsafe { s.update_remainder(tail) },
        }
    }

    fn finalize64(&mut self) -> u64 {
        match self {
            State::Portable(s) => s.finalize64(),
            // SAFETY: as in `update`.
            #[cfg(target_arch = "x86_64")]
            State::Sse41(s) => unsafe { s.finalize64() },
            #[cfg(target_arch = "x86_64")]
            State::Avx2(s) => unsafe { s.finalize64() },
        }
    }

    fn finalize128(&mut self) -> [u64; 2] {
        match self {
            State::Portable(s) => s.finalize128(),
            // SAFETY: as in `update`.
            #[cfg(target_arch = "x86_64")]
            State::Sse41(s) => unsafe { s.finalize128() },
            #[cfg(target_arch = "x86_64")]
            State::Avx2(s) => unsafe { s.finalize128() },
        }
    }

    fn finalize256(&mut self) -> [u64; 4] {
        match self {
            State::Portable(s) => s.finalize256(),
            // SAFETY: as in `update`.
            #[cfg(target_arch = "x86_64")]
            State::Sse41(s) => unsafe { s.finalize256() },
            #[cfg(target_arch = "x86_64")]
            State::Avx2(s) => unsafe { s.finalize256() },
        }
    }
}

// =============================================================================
// STREAMING HASHER
// =============================================================================

/// Incremental HighwayHash over a sequence of appended fragments.
///
/// ```rust
/// let key = [1u64, 2, 3, 4];
/// let mut hasher = highwayhash::HighwayHasher::new(&key);
/// hasher.append(b"split ");
/// hasher.append(b"input");
/// assert_eq!(hasher.finalize64(), highwayhash::hash64(&key, b"split input"));
/// ```
#[derive(Clone)]
pub struct HighwayHasher {
    key: Key,
    state: State,
    buffer: [u8; PACKET_SIZE],
    buffer_usage: usize,
}

impl HighwayHasher {
    /// Create a new hasher keyed with `key`.
    #[must_use]
    pub fn new(key: &Key) -> Self {
        Self {
            key: *key,
            state: State::new(key),
            buffer: [0; PACKET_SIZE],
            buffer_usage: 0,
        }
    }

    /// Append a fragment.
    pub fn append(&mut self, bytes: &[u8]) {
        let capacity = PACKET_SIZE - self.buffer_usage;
        // New bytes fit in the buffer but still do not fill a packet.
        if bytes.len() < capacity {
            self.buffer[self.buffer_usage..self.buffer_usage + bytes.len()]
                .copy_from_slice(bytes);
            self.buffer_usage += bytes.len();
            return;
        }

        let mut rest = bytes;
        if self.buffer_usage != 0 {
            let (head, tail) = rest.split_at(capacity);
            self.buffer[self.buffer_usage..].copy_from_slice(head);
            let packet = self.buffer;
            self.state.update(&packet);
            self.buffer_usage = 0;
            rest = tail;
        }

        // Whole packets straight from the fragment, leftover into the buffer.
        let (packets, tail) = rest.as_chunks::<PACKET_SIZE>();
        for packet in packets {
            self.state.update(packet);
        }
        self.buffer[..tail.len()].copy_from_slice(tail);
        self.buffer_usage = tail.len();
    }

    /// 64-bit digest of everything appended so far.
    ///
    /// Works on a copy of the compression state, so it may be called more
    /// than once and appending may continue afterwards.
    #[must_use]
    pub fn finalize64(&self) -> u64 {
        let mut state = self.state;
        if self.buffer_usage != 0 {
            state.update_remainder(&self.buffer[..self.buffer_usage]);
        }
        state.finalize64()
    }

    /// 128-bit digest of everything appended so far.
    #[must_use]
    pub fn finalize128(&self) -> [u64; 2] {
        let mut state = self.state;
        if self.buffer_usage != 0 {
            state.update_remainder(&self.buffer[..self.buffer_usage]);
        }
        state.finalize128()
    }

    /// 256-bit digest of everything appended so far.
    #[must_use]
    pub fn finalize256(&self) -> [u64; 4] {
        let mut state = self.state;
        if self.buffer_usage != 0 {
            state.update_remainder(&self.buffer[..self.buffer_usage]);
        }
        state.finalize256()
    }

    /// Reset to the freshly keyed state for reuse.
    pub fn reset(&mut self) {
        self.state = State::new(&self.key);
        self.buffer = [0; PACKET_SIZE];
        self.buffer_usage = 0;
    }
}

// =============================================================================
// TRAIT IMPL
// =============================================================================

#[cfg(feature = "digest-trait")]
impl OutputSizeUser for HighwayHasher {
    type OutputSize = U32;
}

#[cfg(feature = "digest-trait")]
impl KeySizeUser for HighwayHasher {
    type KeySize = U32;
}

#[cfg(feature = "digest-trait")]
impl Update for HighwayHasher {
    fn update(&mut self, data: &[u8]) {
        self.append(data);
    }
}

#[cfg(feature = "digest-trait")]
impl FixedOutput for HighwayHasher {
    fn finalize_into(self, out: &mut Output<Self>) {
        let digest = self.finalize256();
        for (chunk, lane) in out.chunks_exact_mut(8).zip(digest.iter()) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
    }
}

#[cfg(feature = "digest-trait")]
impl Reset for HighwayHasher {
    fn reset(&mut self) {
        self.reset();
    }
}

#[cfg(feature = "digest-trait")]
impl HashMarker for HighwayHasher {}

#[cfg(feature = "digest-trait")]
impl KeyInit for HighwayHasher {
    fn new(key: &DigestKey<Self>) -> Self {
        let mut lanes = [0u64; 4];
        for (lane, chunk) in lanes.iter_mut().zip(key.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *lane = u64::from_le_bytes(bytes);
        }
        Self::new(&lanes)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oneshot;

    const KEY: Key = [0xA5, 0x5A, 0x1234_5678, 0x9ABC_DEF0];

    #[test]
    fn empty_matches_oneshot() {
        let hasher = HighwayHasher::new(&KEY);
        assert_eq!(hasher.finalize64(), oneshot::hash64(&KEY, b""));
    }

    #[test]
    fn finalize_is_repeatable_and_append_continues() {
        let mut hasher = HighwayHasher::new(&KEY);
        hasher.append(b"first");
        let digest = hasher.finalize64();
        assert_eq!(hasher.finalize64(), digest);
        assert_eq!(digest, oneshot::hash64(&KEY, b"first"));

        hasher.append(b"second");
        assert_eq!(hasher.finalize64(), oneshot::hash64(&KEY, b"firstsecond"));
    }

    #[test]
    fn reset_restarts_the_stream() {
        let mut hasher = HighwayHasher::new(&KEY);
        hasher.append(b"garbage");
        hasher.reset();
        hasher.append(b"data");
        assert_eq!(hasher.finalize256(), oneshot::hash256(&KEY, b"data"));
    }
}
