//! AVX2 implementation of the HighwayHash state.
//!
//! The whole 4-lane state lives in 256-bit registers; the tail path uses
//! masked 32-bit loads so no read ever extends past the input.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]

use core::arch::x86_64::{
    __m128i, __m256i, _mm256_add_epi64, _mm256_castsi128_si256, _mm256_castsi256_si128,
    _mm256_extracti128_si256, _mm256_inserti128_si256, _mm256_loadu_si256, _mm256_mul_epu32,
    _mm256_or_si256, _mm256_permutevar8x32_epi32, _mm256_set1_epi32, _mm256_set_epi64x,
    _mm256_setr_epi32, _mm256_shuffle_epi32, _mm256_shuffle_epi8, _mm256_sllv_epi32,
    _mm256_srli_epi64, _mm256_srlv_epi32, _mm256_storeu_si256, _mm256_sub_epi32,
    _mm256_xor_si256, _mm_add_epi64, _mm_cmpgt_epi32, _mm_cvtsi128_si64, _mm_cvtsi64_si128,
    _mm_extract_epi64, _mm_insert_epi32, _mm_loadu_si128, _mm_maskload_epi32, _mm_set1_epi32,
    _mm_set_epi32,
};

use crate::kernels::constants::{INIT0, INIT1, PACKET_SIZE, PERMUTE32, ZIPPER_HI, ZIPPER_LO};
use crate::kernels::modular_reduction;
use crate::types::Key;

// =============================================================================
// STATE
// =============================================================================

/// AVX2 state: four 256-bit registers of four 64-bit j-lanes each.
#[derive(Clone, Copy)]
pub struct Avx2State {
    v0: __m256i,
    v1: __m256i,
    mul0: __m256i,
    mul1: __m256i,
}

impl Avx2State {
    /// Initialize from a 256-bit key.
    ///
    /// # Safety
    /// Requires AVX2 (enforced by the dispatcher or a caps check at the call
    /// site).
    #[target_feature(enable = "avx2")]
    #[must_use]
    pub unsafe fn new(key: &Key) -> Self {
        let init0 = _mm256_set_epi64x(
            INIT0[3] as i64,
            INIT0[2] as i64,
            INIT0[1] as i64,
            INIT0[0] as i64,
        );
        let init1 = _mm256_set_epi64x(
            INIT1[3] as i64,
            INIT1[2] as i64,
            INIT1[1] as i64,
            INIT1[0] as i64,
        );
        let key = _mm256_loadu_si256(key.as_ptr().cast());
        Self {
            v0: _mm256_xor_si256(key, init0),
            v1: _mm256_xor_si256(rotate_64_by_32(key), init1),
            mul0: init0,
            mul1: init1,
        }
    }

    /// Inject one 32-byte packet.
    ///
    /// # Safety
    /// Requires AVX2.
    #[target_feature(enable = "avx2")]
    pub unsafe fn update(&mut self, packet: &[u8; PACKET_SIZE]) {
        self.update_vector(_mm256_loadu_si256(packet.as_ptr().cast()));
    }

    /// Updates all four hash lanes in parallel with four 64-bit words.
    #[target_feature(enable = "avx2")]
    unsafe fn update_vector(&mut self, packet: __m256i) {
        self.v1 = _mm256_add_epi64(self.v1, packet);
        self.v1 = _mm256_add_epi64(self.v1, self.mul0);
        self.mul0 = _mm256_xor_si256(
            self.mul0,
            _mm256_mul_epu32(self.v1, _mm256_srli_epi64::<32>(self.v0)),
        );
        self.v0 = _mm256_add_epi64(self.v0, self.mul1);
        self.mul1 = _mm256_xor_si256(
            self.mul1,
            _mm256_mul_epu32(self.v0, _mm256_srli_epi64::<32>(self.v1)),
        );
        self.v0 = _mm256_add_epi64(self.v0, zipper_merge(self.v1));
        self.v1 = _mm256_add_epi64(self.v1, zipper_merge(self.v0));
    }

    /// Inject the final 0..31 bytes with length padding.
    ///
    /// # Safety
    /// Requires AVX2.
    #[target_feature(enable = "avx2")]
    pub unsafe fn update_remainder(&mut self, bytes: &[u8]) {
        let size_mod32 = bytes.len();
        debug_assert!(size_mod32 < PACKET_SIZE);

        let vsize = _mm256_set1_epi32(size_mod32 as i32);
        // Equivalent to storing size_mod32 in the packet.
        self.v0 = _mm256_add_epi64(self.v0, vsize);
        // Boosts the avalanche effect of mod32.
        self.v1 = rotate_32_by(self.v1, vsize);

        let size_mod4 = size_mod32 & 3;

        // (Branching on the residue is faster than a single 256-bit masked
        // load and mirrors what SSE4.1 requires anyway.)
        if size_mod32 & 16 != 0 {
            // 16..31 bytes left.
            let packet_l = _mm_loadu_si128(bytes.as_ptr().cast());
            // Word n of [16, 32) is whole iff size_mod32 >= 16 + (n + 1) * 4;
            // subtract one because only > compares are available.
            let whole_words = _mm_cmpgt_epi32(
                _mm_set1_epi32(size_mod32 as i32),
                _mm_set_epi32(31, 27, 23, 19),
            );
            let packet_h =
                _mm_maskload_epi32(bytes.as_ptr().add(16).cast::<i32>(), whole_words);
            let mut last4 = [0u8; 4];
            last4.copy_from_slice(&bytes[size_mod32 - 4..]);
            // The top four bytes of packet_h are zero, so insert there.
            let packet_h = _mm_insert_epi32::<3>(packet_h, i32::from_le_bytes(last4));
            self.update_vector(combine(packet_h, packet_l));
        } else {
            let whole_words = _mm_cmpgt_epi32(
                _mm_set1_epi32(size_mod32 as i32),
                _mm_set_epi32(15, 11, 7, 3),
            );
            let packet_l = _mm_maskload_epi32(bytes.as_ptr().cast::<i32>(), whole_words);
            // Last 0..3 bytes into the least significant bytes; the offsets
            // {0, size_mod4 >> 1, size_mod4 - 1} all lie within the tail.
            let mut last4: u64 = 0;
            if size_mod4 != 0 {
                let final_bytes = &bytes[size_mod32 & !3..];
                last4 = u64::from(final_bytes[0]);
                last4 += u64::from(final_bytes[size_mod4 >> 1]) << 8;
                last4 += u64::from(final_bytes[size_mod4 - 1]) << 16;
            }
            // Initializing the otherwise empty packet_h beats inserting into
            // lane 3 of packet_l.
            let packet_h = _mm_cvtsi64_si128(last4 as i64);
            self.update_vector(combine(packet_h, packet_l));
        }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn permute_and_update(&mut self) {
        // Swapping the 128-bit halves and the 32-bit lane halves in one
        // cross-lane permute; permuting v0 (slightly) beats permuting v1
        // because the result is added to v1.
        let indices = _mm256_setr_epi32(
            PERMUTE32[0],
            PERMUTE32[1],
            PERMUTE32[2],
            PERMUTE32[3],
            PERMUTE32[4],
            PERMUTE32[5],
            PERMUTE32[6],
            PERMUTE32[7],
        );
        let permuted = _mm256_permutevar8x32_epi32(self.v0, indices);
        self.update_vector(permuted);
    }

    /// 64-bit digest.
    ///
    /// # Safety
    /// Requires AVX2.
    #[target_feature(enable = "avx2")]
    #[must_use]
    pub unsafe fn finalize64(&mut self) -> u64 {
        for _ in 0..4 {
            self.permute_and_update();
        }
        let sum0 = _mm256_castsi256_si128(_mm256_add_epi64(self.v0, self.mul0));
        let sum1 = _mm256_castsi256_si128(_mm256_add_epi64(self.v1, self.mul1));
        // Each lane is sufficiently mixed; truncate to lane 0.
        _mm_cvtsi128_si64(_mm_add_epi64(sum0, sum1)) as u64
    }

    /// 128-bit digest.
    ///
    /// # Safety
    /// Requires AVX2.
    #[target_feature(enable = "avx2")]
    #[must_use]
    pub unsafe fn finalize128(&mut self) -> [u64; 2] {
        for _ in 0..4 {
            self.permute_and_update();
        }
        let sum0 = _mm256_castsi256_si128(_mm256_add_epi64(self.v0, self.mul0));
        let sum1 = _mm256_extracti128_si256::<1>(_mm256_add_epi64(self.v1, self.mul1));
        let hash = _mm_add_epi64(sum0, sum1);
        [
            _mm_cvtsi128_si64(hash) as u64,
            _mm_extract_epi64::<1>(hash) as u64,
        ]
    }

    /// 256-bit digest.
    ///
    /// # Safety
    /// Requires AVX2.
    #[target_feature(enable = "avx2")]
    #[must_use]
    pub unsafe fn finalize256(&mut self) -> [u64; 4] {
        for _ in 0..4 {
            self.permute_and_update();
        }
        let mut sum0 = [0u64; 4];
        let mut sum1 = [0u64; 4];
        _mm256_storeu_si256(
            sum0.as_mut_ptr().cast(),
            _mm256_add_epi64(self.v0, self.mul0),
        );
        _mm256_storeu_si256(
            sum1.as_mut_ptr().cast(),
            _mm256_add_epi64(self.v1, self.mul1),
        );
        let (m1, m0) = modular_reduction(sum1[1], sum1[0], sum0[1], sum0[0]);
        let (m3, m2) = modular_reduction(sum1[3], sum1[2], sum0[3], sum0[2]);
        [m0, m1, m2, m3]
    }
}

// =============================================================================
// VECTOR HELPERS
// =============================================================================

#[target_feature(enable = "avx2")]
unsafe fn combine(hi: __m128i, lo: __m128i) -> __m256i {
    _mm256_inserti128_si256::<1>(_mm256_castsi128_si256(lo), hi)
}

#[target_feature(enable = "avx2")]
unsafe fn rotate_64_by_32(v: __m256i) -> __m256i {
    // _MM_SHUFFLE(2, 3, 0, 1): swap the 32-bit halves of each 64-bit lane.
    _mm256_shuffle_epi32::<0xB1>(v)
}

/// Rotates every 32-bit lane left by `count` bits (variable shifts; the
/// fixed-count forms pay a latency tax to broadcast the count).
#[target_feature(enable = "avx2")]
unsafe fn rotate_32_by(v: __m256i, count: __m256i) -> __m256i {
    let left = _mm256_sllv_epi32(v, count);
    let right = _mm256_srlv_epi32(v, _mm256_sub_epi32(_mm256_set1_epi32(32), count));
    _mm256_or_si256(left, right)
}

#[target_feature(enable = "avx2")]
unsafe fn zipper_merge(v: __m256i) -> __m256i {
    let control = _mm256_set_epi64x(
        ZIPPER_HI as i64,
        ZIPPER_LO as i64,
        ZIPPER_HI as i64,
        ZIPPER_LO as i64,
    );
    _mm256_shuffle_epi8(v, control)
}

// =============================================================================
// ONE-SHOT DRIVERS
// =============================================================================

#[target_feature(enable = "avx2")]
unsafe fn update_all(state: &mut Avx2State, bytes: &[u8]) {
    let (packets, tail) = bytes.as_chunks::<PACKET_SIZE>();
    for packet in packets {
        state.update(packet);
    }
    if !tail.is_empty() {
        state.update_remainder(tail);
    }
}

/// One-shot 64-bit hash with the AVX2 kernel.
///
/// # Safety
/// Requires AVX2 (enforced by the dispatcher).
#[target_feature(enable = "avx2")]
#[must_use]
pub unsafe fn hash64(key: &Key, bytes: &[u8]) -> u64 {
    let mut state = Avx2State::new(key);
    update_all(&mut state, bytes);
    state.finalize64()
}

/// One-shot 128-bit hash with the AVX2 kernel.
///
/// # Safety
/// Requires AVX2 (enforced by the dispatcher).
#[target_feature(enable = "avx2")]
#[must_use]
pub unsafe fn hash128(key: &Key, bytes: &[u8]) -> [u64; 2] {
    let mut state = Avx2State::new(key);
    update_all(&mut state, bytes);
    state.finalize128()
}

/// One-shot 256-bit hash with the AVX2 kernel.
///
/// # Safety
/// Requires AVX2 (enforced by the dispatcher).
#[target_feature(enable = "avx2")]
#[must_use]
pub unsafe fn hash256(key: &Key, bytes: &[u8]) -> [u64; 4] {
    let mut state = Avx2State::new(key);
    update_all(&mut state, bytes);
    state.finalize256()
}
