//! Known-answer and length-distinguishability tests.
//!
//! The 64-bit known answers are the published HighwayHash reference vectors
//! for the standard test key (key byte i = i) and inputs data[i] = i.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

const TEST_KEY: [u64; 4] = [
    0x0706_0504_0302_0100,
    0x0F0E_0D0C_0B0A_0908,
    0x1716_1514_1312_1110,
    0x1F1E_1D1C_1B1A_1918,
];

// =============================================================================
// KNOWN ANSWERS
// =============================================================================

/// Expected 64-bit digests for input lengths 0..=8.
const EXPECTED64: [u64; 9] = [
    0x907A_56DE_22C2_6E53,
    0x7EAB_43AA_C7CD_DD78,
    0xB8D0_569A_B0B5_3D62,
    0x5C6B_EFAB_8A46_3D80,
    0xF205_A468_9300_7EDA,
    0x2B8A_1668_E4A9_4541,
    0xBD4C_CC32_5BEF_CA6F,
    0x4D02_AE17_38F5_9482,
    0xE120_5108_E55F_3171,
];

#[test]
fn reference_vectors_64() {
    let data: Vec<u8> = (0..64u8).collect();
    for (n, &expected) in EXPECTED64.iter().enumerate() {
        let actual = highwayhash::hash64(&TEST_KEY, &data[..n]);
        assert_eq!(
            actual, expected,
            "n={n}: got {actual:016X}, want {expected:016X}"
        );
    }
}

#[test]
fn empty_input_is_a_fixed_constant() {
    // All backends must report the same constant for the empty input.
    assert_eq!(
        highwayhash::kernels::portable::hash64(&TEST_KEY, b""),
        EXPECTED64[0]
    );
    assert_eq!(highwayhash::hash64(&TEST_KEY, b""), EXPECTED64[0]);
}

// =============================================================================
// LENGTH DISTINGUISHABILITY
// =============================================================================

#[test]
fn zero_inputs_of_different_lengths_diverge() {
    let zeros = vec![0u8; 512];
    let mut seen = HashSet::new();
    for n in 0..=512 {
        let digest = highwayhash::hash64(&TEST_KEY, &zeros[..n]);
        assert!(seen.insert(digest), "collision between zero inputs at n={n}");
    }
}

#[test]
fn zero_inputs_diverge_in_all_widths() {
    let zeros = vec![0u8; 96];
    let mut seen128 = HashSet::new();
    let mut seen256 = HashSet::new();
    for n in 0..=96 {
        assert!(seen128.insert(highwayhash::hash128(&TEST_KEY, &zeros[..n])));
        assert!(seen256.insert(highwayhash::hash256(&TEST_KEY, &zeros[..n])));
    }
}

#[test]
fn output_widths_are_unrelated() {
    // The three widths come from different state projections; sanity-check
    // they do not alias each other.
    let data: Vec<u8> = (0..100u8).collect();
    let h64 = highwayhash::hash64(&TEST_KEY, &data);
    let h128 = highwayhash::hash128(&TEST_KEY, &data);
    let h256 = highwayhash::hash256(&TEST_KEY, &data);
    assert_ne!(h64, h128[0]);
    assert_ne!(h128[0], h256[0]);
}

// =============================================================================
// FORMATTING SANITY
// =============================================================================

#[test]
fn digest_bytes_roundtrip_hex() {
    let digest = highwayhash::hash256(&TEST_KEY, b"format me");
    let mut bytes = Vec::with_capacity(32);
    for lane in digest {
        bytes.extend_from_slice(&lane.to_le_bytes());
    }
    let encoded = hex::encode(&bytes);
    assert_eq!(hex::decode(&encoded).unwrap(), bytes);
    assert_eq!(encoded.len(), 64);
}
