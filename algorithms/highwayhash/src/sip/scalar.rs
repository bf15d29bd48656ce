//! Scalar SipHash core and the j-lanes tree reference.
//!
//! SipHash-c-d runs `C` compression rounds per 8-byte packet and `D` at
//! finalization; 2-4 is the original, 1-3 the faster variant with the same
//! structure. The tree variant interleaves 8-byte words across four
//! independent states and reduces their outputs with one more SipHash.

use crate::types::{Key, SipKey};

pub(crate) const NUM_LANES: usize = 4;
pub(crate) const TREE_PACKET_SIZE: usize = 32;

// SipHash initialization constants ("somepseudorandomlygeneratedbytes").
pub(crate) const C0: u64 = 0x736f_6d65_7073_6575;
pub(crate) const C1: u64 = 0x646f_7261_6e64_6f6d;
pub(crate) const C2: u64 = 0x6c79_6765_6e65_7261;
pub(crate) const C3: u64 = 0x7465_6462_7974_6573;

// =============================================================================
// STATE
// =============================================================================

/// SipHash-c-d state: `C` rounds per packet, `D` rounds at finalize.
#[derive(Clone, Copy)]
pub struct SipState<const C: usize, const D: usize> {
    v0: u64,
    v1: u64,
    v2: u64,
    v3: u64,
}

/// SipHash-2-4.
pub type SipState24 = SipState<2, 4>;

/// SipHash-1-3.
pub type SipState13 = SipState<1, 3>;

impl<const C: usize, const D: usize> SipState<C, D> {
    /// Initialize from a 128-bit key.
    #[must_use]
    pub fn new(key: &SipKey) -> Self {
        Self {
            v0: C0 ^ key[0],
            v1: C1 ^ key[1],
            v2: C2 ^ key[0],
            v3: C3 ^ key[1],
        }
    }

    /// Initialize one lane of the j-lanes tree: the key lane is XORed with
    /// `kNumLanes | lane` so the four streams are independent PRFs.
    pub(crate) fn new_tree_lane(keys: &Key, lane: usize) -> Self {
        let key = keys[lane] ^ (NUM_LANES as u64 | lane as u64);
        Self {
            v0: C0 ^ key,
            v1: C1 ^ key,
            v2: C2 ^ key,
            v3: C3 ^ key,
        }
    }

    /// Inject one 8-byte packet.
    #[inline]
    pub fn update(&mut self, packet: u64) {
        self.v3 ^= packet;
        self.compress(C);
        self.v0 ^= packet;
    }

    /// Produce the 64-bit hash.
    #[inline]
    #[must_use]
    pub fn finalize(mut self) -> u64 {
        // Mix in bits so an all-zero packet stream does not leak the key.
        self.v2 ^= 0xFF;
        self.compress(D);
        (self.v0 ^ self.v1) ^ (self.v2 ^ self.v3)
    }

    #[inline]
    fn compress(&mut self, rounds: usize) {
        for _ in 0..rounds {
            // ARX network: add, rotate, exclusive-or.
            self.v0 = self.v0.wrapping_add(self.v1);
            self.v2 = self.v2.wrapping_add(self.v3);
            self.v1 = self.v1.rotate_left(13);
            self.v3 = self.v3.rotate_left(16);
            self.v1 ^= self.v0;
            self.v3 ^= self.v2;

            self.v0 = self.v0.rotate_left(32);

            self.v2 = self.v2.wrapping_add(self.v1);
            self.v0 = self.v0.wrapping_add(self.v3);
            self.v1 = self.v1.rotate_left(17);
            self.v3 = self.v3.rotate_left(21);
            self.v1 ^= self.v2;
            self.v3 ^= self.v0;

            self.v2 = self.v2.rotate_left(32);
        }
    }
}

// =============================================================================
// DRIVERS
// =============================================================================

/// One-shot SipHash-c-d with the standard length padding: the residue goes
/// into a zeroed 8-byte packet whose top byte is `size & 0xFF`. The padded
/// packet is always injected, including when the size is a multiple of 8.
pub(crate) fn sip_hash<const C: usize, const D: usize>(key: &SipKey, bytes: &[u8]) -> u64 {
    let mut state = SipState::<C, D>::new(key);
    let (packets, tail) = bytes.as_chunks::<8>();
    for packet in packets {
        state.update(u64::from_le_bytes(*packet));
    }

    let mut final_packet = [0u8; 8];
    final_packet[..tail.len()].copy_from_slice(tail);
    final_packet[7] = bytes.len() as u8;
    state.update(u64::from_le_bytes(final_packet));

    state.finalize()
}

/// Reduce the four tree-lane hashes with an (unpadded) SipHash-2-4 keyed by
/// the first two key lanes.
pub(crate) fn reduce_tree(key: &SipKey, hashes: &[u64; NUM_LANES]) -> u64 {
    let mut state = SipState24::new(key);
    for &hash in hashes {
        state.update(hash);
    }
    state.finalize()
}

/// Builds the length-padded final 32-byte tree packet shared by the scalar
/// and SIMD variants: whole 32-bit words of the residue, then the final u32
/// is `(remainder << 24) + the trailing 0..3 bytes`.
pub(crate) fn tree_final_packet(tail: &[u8]) -> [u8; TREE_PACKET_SIZE] {
    let remainder = tail.len();
    let remainder_mod4 = remainder & 3;
    let whole = remainder - remainder_mod4;

    let mut packet4 = (remainder as u32) << 24;
    for (i, &byte) in tail[whole..].iter().enumerate() {
        packet4 += u32::from(byte) << (i * 8);
    }

    let mut packet = [0u8; TREE_PACKET_SIZE];
    packet[..whole].copy_from_slice(&tail[..whole]);
    packet[TREE_PACKET_SIZE - 4..].copy_from_slice(&packet4.to_le_bytes());
    packet
}

/// Scalar j-lanes SipTreeHash reference: 8-byte input words are dealt
/// round-robin to four SipHash-2-4 states, and the four lane hashes are
/// reduced by one more SipHash.
#[must_use]
pub fn siptree_hash_scalar(key: &Key, bytes: &[u8]) -> u64 {
    let mut states = [
        SipState24::new_tree_lane(key, 0),
        SipState24::new_tree_lane(key, 1),
        SipState24::new_tree_lane(key, 2),
        SipState24::new_tree_lane(key, 3),
    ];

    let (packets, tail) = bytes.as_chunks::<TREE_PACKET_SIZE>();
    for packet in packets {
        for (state, word) in states.iter_mut().zip(packet.as_chunks::<8>().0) {
            state.update(u64::from_le_bytes(*word));
        }
    }

    // The final packet is always injected, even for whole-packet inputs.
    let final_packet = tree_final_packet(tail);
    for (state, word) in states.iter_mut().zip(final_packet.as_chunks::<8>().0) {
        state.update(u64::from_le_bytes(*word));
    }

    let mut hashes = [0u64; NUM_LANES];
    for (hash, state) in hashes.iter_mut().zip(states.into_iter()) {
        *hash = state.finalize();
    }
    reduce_tree(&[key[0], key[1]], &hashes)
}

// =============================================================================
// TESTS
// =============================================================================
