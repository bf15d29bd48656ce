//! SSE4.1 implementation of the HighwayHash state.
//!
//! The 4-lane state is duplicated across pairs of 128-bit registers: `l`
//! holds lanes 0-1, `h` lanes 2-3. Data flow matches the AVX2 kernel
//! half-for-half; the finalize permute falls out of reading the rotated `h`
//! register as the low half and the rotated `l` register as the high half.
//! Drop-in bit-compatible with the portable and AVX2 kernels.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]

use core::arch::x86_64::{
    __m128i, _mm_add_epi64, _mm_cvtsi128_si64, _mm_cvtsi32_si128, _mm_cvtsi64_si128,
    _mm_extract_epi64, _mm_insert_epi32, _mm_loadl_epi64, _mm_loadu_si128, _mm_mul_epu32,
    _mm_or_si128, _mm_set1_epi32, _mm_set_epi64x, _mm_setzero_si128, _mm_shuffle_epi32,
    _mm_shuffle_epi8, _mm_sll_epi32, _mm_slli_si128, _mm_srl_epi32, _mm_srli_epi64,
    _mm_xor_si128,
};

use crate::kernels::constants::{INIT0, INIT1, PACKET_SIZE, ZIPPER_HI, ZIPPER_LO};
use crate::kernels::modular_reduction;
use crate::types::Key;

// =============================================================================
// STATE
// =============================================================================

/// SSE4.1 state: eight 128-bit registers.
#[derive(Clone, Copy)]
pub struct Sse41State {
    v0l: __m128i,
    v0h: __m128i,
    v1l: __m128i,
    v1h: __m128i,
    mul0l: __m128i,
    mul0h: __m128i,
    mul1l: __m128i,
    mul1h: __m128i,
}

impl Sse41State {
    /// Initialize from a 256-bit key.
    ///
    /// # Safety
    /// Requires SSE4.1 (enforced by the dispatcher or a caps check at the
    /// call site).
    #[target_feature(enable = "sse4.1")]
    #[must_use]
    pub unsafe fn new(key: &Key) -> Self {
        let init0l = _mm_set_epi64x(INIT0[1] as i64, INIT0[0] as i64);
        let init0h = _mm_set_epi64x(INIT0[3] as i64, INIT0[2] as i64);
        let init1l = _mm_set_epi64x(INIT1[1] as i64, INIT1[0] as i64);
        let init1h = _mm_set_epi64x(INIT1[3] as i64, INIT1[2] as i64);
        let keyl = _mm_loadu_si128(key.as_ptr().cast());
        let keyh = _mm_loadu_si128(key.as_ptr().add(2).cast());
        Self {
            v0l: _mm_xor_si128(keyl, init0l),
            v0h: _mm_xor_si128(keyh, init0h),
            v1l: _mm_xor_si128(rotate_64_by_32(keyl), init1l),
            v1h: _mm_xor_si128(rotate_64_by_32(keyh), init1h),
            mul0l: init0l,
            mul0h: init0h,
            mul1l: init1l,
            mul1h: init1h,
        }
    }

    /// Inject one 32-byte packet.
    ///
    /// # Safety
    /// Requires SSE4.1.
    #[target_feature(enable = "sse4.1")]
    pub unsafe fn update(&mut self, packet: &[u8; PACKET_SIZE]) {
        let packet_l = _mm_loadu_si128(packet.as_ptr().cast());
        let packet_h = _mm_loadu_si128(packet.as_ptr().add(16).cast());
        self.update_halves(packet_h, packet_l);
    }

    #[target_feature(enable = "sse4.1")]
    unsafe fn update_halves(&mut self, packet_h: __m128i, packet_l: __m128i) {
        self.v1l = _mm_add_epi64(self.v1l, packet_l);
        self.v1h = _mm_add_epi64(self.v1h, packet_h);
        self.v1l = _mm_add_epi64(self.v1l, self.mul0l);
        self.v1h = _mm_add_epi64(self.v1h, self.mul0h);
        self.mul0l = _mm_xor_si128(
            self.mul0l,
            _mm_mul_epu32(self.v1l, _mm_srli_epi64::<32>(self.v0l)),
        );
        self.mul0h = _mm_xor_si128(
            self.mul0h,
            _mm_mul_epu32(self.v1h, _mm_srli_epi64::<32>(self.v0h)),
        );
        self.v0l = _mm_add_epi64(self.v0l, self.mul1l);
        self.v0h = _mm_add_epi64(self.v0h, self.mul1h);
        self.mul1l = _mm_xor_si128(
            self.mul1l,
            _mm_mul_epu32(self.v0l, _mm_srli_epi64::<32>(self.v1l)),
        );
        self.mul1h = _mm_xor_si128(
            self.mul1h,
            _mm_mul_epu32(self.v0h, _mm_srli_epi64::<32>(self.v1h)),
        );
        self.v0l = _mm_add_epi64(self.v0l, zipper_merge(self.v1l));
        self.v0h = _mm_add_epi64(self.v0h, zipper_merge(self.v1h));
        self.v1l = _mm_add_epi64(self.v1l, zipper_merge(self.v0l));
        self.v1h = _mm_add_epi64(self.v1h, zipper_merge(self.v0h));
    }

    /// Inject the final 0..31 bytes with length padding.
    ///
    /// # Safety
    /// Requires SSE4.1.
    #[target_feature(enable = "sse4.1")]
    pub unsafe fn update_remainder(&mut self, bytes: &[u8]) {
        let size_mod32 = bytes.len();
        debug_assert!(size_mod32 < PACKET_SIZE);

        // Adding the broadcast 32-bit size to each 64-bit lane injects
        // (size << 32) | size, matching the scalar kernel.
        let vsize = _mm_set1_epi32(size_mod32 as i32);
        self.v0l = _mm_add_epi64(self.v0l, vsize);
        self.v0h = _mm_add_epi64(self.v0h, vsize);
        self.v1l = rotate_32_by(self.v1l, size_mod32 as i64);
        self.v1h = rotate_32_by(self.v1h, size_mod32 as i64);

        let size_mod4 = size_mod32 & 3;

        if size_mod32 & 16 != 0 {
            // 16..31 bytes left.
            let packet_l = _mm_loadu_si128(bytes.as_ptr().cast());
            let packet_h = load_multiple_of_four(bytes.as_ptr().add(16), size_mod32);
            let mut last4 = [0u8; 4];
            last4.copy_from_slice(&bytes[size_mod32 - 4..]);
            // The top four bytes of packet_h are zero, so insert there.
            let packet_h = _mm_insert_epi32::<3>(packet_h, i32::from_le_bytes(last4));
            self.update_halves(packet_h, packet_l);
        } else {
            let packet_l = load_multiple_of_four(bytes.as_ptr(), size_mod32);
            // Last 0..3 bytes into the least significant bytes; the offsets
            // {0, size_mod4 >> 1, size_mod4 - 1} all lie within the tail.
            let mut last4: u64 = 0;
            if size_mod4 != 0 {
                let final_bytes = &bytes[size_mod32 & !3..];
                last4 = u64::from(final_bytes[0]);
                last4 += u64::from(final_bytes[size_mod4 >> 1]) << 8;
                last4 += u64::from(final_bytes[size_mod4 - 1]) << 16;
            }
            // Initializing the otherwise empty upper half beats inserting
            // into lane 3 of packet_l.
            let packet_h = _mm_cvtsi64_si128(last4 as i64);
            self.update_halves(packet_h, packet_l);
        }
    }

    #[target_feature(enable = "sse4.1")]
    unsafe fn permute_and_update(&mut self) {
        // The AVX2 cross-half permute is free here: the rotated high pair is
        // read back as the low half and vice versa.
        let permuted_l = rotate_64_by_32(self.v0h);
        let permuted_h = rotate_64_by_32(self.v0l);
        self.update_halves(permuted_h, permuted_l);
    }

    /// 64-bit digest.
    ///
    /// # Safety
    /// Requires SSE4.1.
    #[target_feature(enable = "sse4.1")]
    #[must_use]
    pub unsafe fn finalize64(&mut self) -> u64 {
        for _ in 0..4 {
            self.permute_and_update();
        }
        let sum0 = _mm_add_epi64(self.v0l, self.mul0l);
        let sum1 = _mm_add_epi64(self.v1l, self.mul1l);
        let hash = _mm_add_epi64(sum0, sum1);
        _mm_cvtsi128_si64(hash) as u64
    }

    /// 128-bit digest.
    ///
    /// # Safety
    /// Requires SSE4.1.
    #[target_feature(enable = "sse4.1")]
    #[must_use]
    pub unsafe fn finalize128(&mut self) -> [u64; 2] {
        for _ in 0..4 {
            self.permute_and_update();
        }
        let sum0 = _mm_add_epi64(self.v0l, self.mul0l);
        let sum1 = _mm_add_epi64(self.v1h, self.mul1h);
        let hash = _mm_add_epi64(sum0, sum1);
        [
            _mm_cvtsi128_si64(hash) as u64,
            _mm_extract_epi64::<1>(hash) as u64,
        ]
    }

    /// 256-bit digest.
    ///
    /// # Safety
    /// Requires SSE4.1.
    #[target_feature(enable = "sse4.1")]
    #[must_use]
    pub unsafe fn finalize256(&mut self) -> [u64; 4] {
        for _ in 0..4 {
            self.permute_and_update();
        }
        let sum0l = _mm_add_epi64(self.v0l, self.mul0l);
        let sum0h = _mm_add_epi64(self.v0h, self.mul0h);
        let sum1l = _mm_add_epi64(self.v1l, self.mul1l);
        let sum1h = _mm_add_epi64(self.v1h, self.mul1h);
        let (m1, m0) = modular_reduction(
            _mm_extract_epi64::<1>(sum1l) as u64,
            _mm_cvtsi128_si64(sum1l) as u64,
            _mm_extract_epi64::<1>(sum0l) as u64,
            _mm_cvtsi128_si64(sum0l) as u64,
        );
        let (m3, m2) = modular_reduction(
            _mm_extract_epi64::<1>(sum1h) as u64,
            _mm_cvtsi128_si64(sum1h) as u64,
            _mm_extract_epi64::<1>(sum0h) as u64,
            _mm_cvtsi128_si64(sum0h) as u64,
        );
        [m0, m1, m2, m3]
    }
}

// =============================================================================
// VECTOR HELPERS
// =============================================================================

#[target_feature(enable = "sse4.1")]
unsafe fn rotate_64_by_32(v: __m128i) -> __m128i {
    // _MM_SHUFFLE(2, 3, 0, 1): swap the 32-bit halves of each 64-bit lane.
    _mm_shuffle_epi32::<0xB1>(v)
}

/// Rotates every 32-bit lane left by the (uniform) `count` bits.
///
/// SSE4.1 has no per-lane variable shift; a whole-register shift count in an
/// XMM register is enough because the count is the same for all lanes. For
/// `count == 0` the right shift by 32 yields zero, so the OR is the identity.
#[target_feature(enable = "sse4.1")]
unsafe fn rotate_32_by(v: __m128i, count: i64) -> __m128i {
    let left = _mm_sll_epi32(v, _mm_cvtsi64_si128(count));
    let right = _mm_srl_epi32(v, _mm_cvtsi64_si128(32 - count));
    _mm_or_si128(left, right)
}

#[target_feature(enable = "sse4.1")]
unsafe fn zipper_merge(v: __m128i) -> __m128i {
    _mm_shuffle_epi8(v, _mm_set_epi64x(ZIPPER_HI as i64, ZIPPER_LO as i64))
}

/// Loads the whole 32-bit words of a 0..16-byte region, zeroing the rest.
/// Never reads past the last whole word, emulating a masked load.
///
/// `size` may carry bit 4 (the caller's `size_mod32`); only bits 3 and 2
/// select the words.
#[target_feature(enable = "sse4.1")]
unsafe fn load_multiple_of_four(ptr: *const u8, size: usize) -> __m128i {
    let mut ret = _mm_setzero_si128();
    if size & 8 != 0 {
        // SAFETY: at least 8 accessible bytes at ptr.
        ret = _mm_loadl_epi64(ptr.cast());
        if size & 4 != 0 {
            let word = ptr.add(8).cast::<u32>().read_unaligned();
            ret = _mm_or_si128(ret, _mm_slli_si128::<8>(_mm_cvtsi32_si128(word as i32)));
        }
    } else if size & 4 != 0 {
        let word = ptr.cast::<u32>().read_unaligned();
        ret = _mm_cvtsi32_si128(word as i32);
    }
    ret
}

// =============================================================================
// ONE-SHOT DRIVERS
// =============================================================================

#[target_feature(enable = "sse4.1")]
unsafe fn update_all(state: &mut Sse41State, bytes: &[u8]) {
    let (packets, tail) = bytes.as_chunks::<PACKET_SIZE>();
    for packet in packets {
        state.update(packet);
    }
    if !tail.is_empty() {
        state.update_remainder(tail);
    }
}

/// One-shot 64-bit hash with the SSE4.1 kernel.
///
/// # Safety
/// Requires SSE4.1 (enforced by the dispatcher).
#[target_feature(enable = "sse4.1")]
#[must_use]
pub unsafe fn hash64(key: &Key, bytes: &[u8]) -> u64 {
    let mut state = Sse41State::new(key);
    update_all(&mut state, bytes);
    state.finalize64()
}

/// One-shot 128-bit hash with the SSE4.1 kernel.
///
/// # Safety
/// Requires SSE4.1 (enforced by the dispatcher).
#[target_feature(enable = "sse4.1")]
#[must_use]
pub unsafe fn hash128(key: &Key, bytes: &[u8]) -> [u64; 2] {
    let mut state = Sse41State::new(key);
    update_all(&mut state, bytes);
    state.finalize128()
}

/// One-shot 256-bit hash with the SSE4.1 kernel.
///
/// # Safety
/// Requires SSE4.1 (enforced by the dispatcher).
#[target_feature(enable = "sse4.1")]
#[must_use]
pub unsafe fn hash256(key: &Key, bytes: &[u8]) -> [u64; 4] {
    let mut state = Sse41State::new(key);
    update_all(&mut state, bytes);
    state.finalize256()
}
