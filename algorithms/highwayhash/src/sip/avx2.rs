//! AVX2 SipTreeHash kernel: the four SipHash lanes live in single 256-bit
//! registers, so one SipRound advances all four streams at once. Tail bytes
//! are gathered with a masked 32-bit load so no read passes the end of the
//! input. Bit-compatible with the scalar reference.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]

use core::arch::x86_64::{
    __m256i, _mm256_add_epi64, _mm256_blend_epi32, _mm256_broadcastd_epi32, _mm256_cvtepi8_epi32,
    _mm256_loadu_si256, _mm256_maskload_epi32, _mm256_or_si256, _mm256_permute4x64_epi64,
    _mm256_set1_epi64x, _mm256_set_epi64x, _mm256_shuffle_epi32, _mm256_shuffle_epi8,
    _mm256_slli_epi64, _mm256_srli_epi64, _mm256_storeu_si256, _mm256_xor_si256,
    _mm_cvtsi32_si128, _mm_cvtsi64_si128,
};

use crate::sip::scalar::{reduce_tree, C0, C1, C2, C3, NUM_LANES, TREE_PACKET_SIZE};
use crate::types::Key;

// =============================================================================
// STATE
// =============================================================================

struct SipTreeState {
    v0: __m256i,
    v1: __m256i,
    v2: __m256i,
    v3: __m256i,
}

#[target_feature(enable = "avx2")]
unsafe fn new_state(key: &Key) -> SipTreeState {
    let init = _mm256_set_epi64x(C3 as i64, C2 as i64, C1 as i64, C0 as i64);
    let lane_tags = _mm256_set_epi64x(
        (NUM_LANES | 3) as i64,
        (NUM_LANES | 2) as i64,
        (NUM_LANES | 1) as i64,
        NUM_LANES as i64,
    );
    let key_vec = _mm256_xor_si256(_mm256_loadu_si256(key.as_ptr().cast()), lane_tags);
    SipTreeState {
        v0: _mm256_xor_si256(_mm256_permute4x64_epi64::<0x00>(init), key_vec),
        v1: _mm256_xor_si256(_mm256_permute4x64_epi64::<0x55>(init), key_vec),
        v2: _mm256_xor_si256(_mm256_permute4x64_epi64::<0xAA>(init), key_vec),
        v3: _mm256_xor_si256(_mm256_permute4x64_epi64::<0xFF>(init), key_vec),
    }
}

#[target_feature(enable = "avx2")]
unsafe fn update(s: &mut SipTreeState, packet: __m256i) {
    s.v3 = _mm256_xor_si256(s.v3, packet);
    compress(s, 2);
    s.v0 = _mm256_xor_si256(s.v0, packet);
}

#[target_feature(enable = "avx2")]
unsafe fn compress(s: &mut SipTreeState, rounds: usize) {
    for _ in 0..rounds {
        // ARX network: add, rotate, exclusive-or.
        s.v0 = _mm256_add_epi64(s.v0, s.v1);
        s.v2 = _mm256_add_epi64(s.v2, s.v3);
        s.v1 = rotate_left_13(s.v1);
        s.v3 = rotate_left_16(s.v3);
        s.v1 = _mm256_xor_si256(s.v1, s.v0);
        s.v3 = _mm256_xor_si256(s.v3, s.v2);

        s.v0 = rotate_left_32(s.v0);

        s.v2 = _mm256_add_epi64(s.v2, s.v1);
        s.v0 = _mm256_add_epi64(s.v0, s.v3);
        s.v1 = rotate_left_17(s.v1);
        s.v3 = rotate_left_21(s.v3);
        s.v1 = _mm256_xor_si256(s.v1, s.v2);
        s.v3 = _mm256_xor_si256(s.v3, s.v0);

        s.v2 = rotate_left_32(s.v2);
    }
}

// =============================================================================
// ROTATES
// =============================================================================

#[target_feature(enable = "avx2")]
unsafe fn rotate_left_13(v: __m256i) -> __m256i {
    _mm256_or_si256(_mm256_slli_epi64::<13>(v), _mm256_srli_epi64::<51>(v))
}

/// Rotation by 16 is a byte permutation.
#[target_feature(enable = "avx2")]
unsafe fn rotate_left_16(v: __m256i) -> __m256i {
    let control = _mm256_set_epi64x(
        0x0D0C_0B0A_0908_0F0E_u64 as i64,
        0x0504_0302_0100_0706_u64 as i64,
        0x0D0C_0B0A_0908_0F0E_u64 as i64,
        0x0504_0302_0100_0706_u64 as i64,
    );
    _mm256_shuffle_epi8(v, control)
}

#[target_feature(enable = "avx2")]
unsafe fn rotate_left_17(v: __m256i) -> __m256i {
    _mm256_or_si256(_mm256_slli_epi64::<17>(v), _mm256_srli_epi64::<47>(v))
}

#[target_feature(enable = "avx2")]
unsafe fn rotate_left_21(v: __m256i) -> __m256i {
    _mm256_or_si256(_mm256_slli_epi64::<21>(v), _mm256_srli_epi64::<43>(v))
}

/// Rotation by 32 is a 32-bit element swap.
#[target_feature(enable = "avx2")]
unsafe fn rotate_left_32(v: __m256i) -> __m256i {
    // _MM_SHUFFLE(2, 3, 0, 1)
    _mm256_shuffle_epi32::<0xB1>(v)
}

// =============================================================================
// TAIL LOAD
// =============================================================================

/// Returns the final 32-byte packet: whole 32-bit words of the 0..31-byte
/// residue via a masked load (reading past the end risks a page fault which
/// even LDDQU could not avoid), and `(remainder << 24) + trailing bytes` in
/// the top word.
#[target_feature(enable = "avx2")]
unsafe fn load_final_packet(tail: &[u8]) -> __m256i {
    let remainder = tail.len();
    let remaining_words = remainder >> 2; // 0..7

    // mask[32*i+31] := word i accessible ? 1 : 0. Packed byte mask shifted
    // into place, then sign-extended so each 0xFF becomes 0xFFFFFFFF.
    let packed_mask = 0x00FF_FFFF_FFFF_FFFF_u64 >> ((7 - remaining_words) * 8);
    let mask = _mm256_cvtepi8_epi32(_mm_cvtsi64_si128(packed_mask as i64));
    let packet28 = _mm256_maskload_epi32(tail.as_ptr().cast::<i32>(), mask);

    let mut packet4 = (remainder as u32) << 24;
    for (i, &byte) in tail[remaining_words * 4..].iter().enumerate() {
        packet4 += u32::from(byte) << (i * 8);
    }

    // The top word of packet28 is zero; blend the length word in there.
    let broadcast4 = _mm256_broadcastd_epi32(_mm_cvtsi32_si128(packet4 as i32));
    _mm256_blend_epi32::<0x80>(packet28, broadcast4)
}

// =============================================================================
// DRIVER
// =============================================================================

/// AVX2 j-lanes SipTreeHash.
///
/// # Safety
/// Requires AVX2 (enforced by the dispatcher in `sip::siptree_hash`).
#[target_feature(enable = "avx2")]
#[must_use]
pub unsafe fn siptree_hash(key: &Key, bytes: &[u8]) -> u64 {
    let mut state = new_state(key);

    let (packets, tail) = bytes.as_chunks::<TREE_PACKET_SIZE>();
    for packet in packets {
        update(&mut state, _mm256_loadu_si256(packet.as_ptr().cast()));
    }
    update(&mut state, load_final_packet(tail));

    // Finalize all four lanes: v2 ^= 0xFF, four rounds, fold.
    state.v2 = _mm256_xor_si256(state.v2, _mm256_set1_epi64x(0xFF));
    compress(&mut state, 4);
    let folded = _mm256_xor_si256(
        _mm256_xor_si256(state.v0, state.v1),
        _mm256_xor_si256(state.v2, state.v3),
    );

    let mut hashes = [0u64; NUM_LANES];
    _mm256_storeu_si256(hashes.as_mut_ptr().cast(), folded);
    reduce_tree(&[key[0], key[1]], &hashes)
}
