//! Streaming ("cat") vs. one-shot equivalence.
//!
//! Appending any partition of a byte string must produce the same digests as
//! the one-shot driver on the concatenation, for every output width.

#![allow(clippy::unwrap_used)]

use highwayhash::HighwayHasher;
use rand::prelude::*;

const KEY: [u64; 4] = [
    0x0706_0504_0302_0100,
    0x0F0E_0D0C_0B0A_0908,
    0x1716_1514_1312_1110,
    0x1F1E_1D1C_1B1A_1918,
];

fn test_input(n: usize) -> Vec<u8> {
    (0..n).map(|i| i as u8).collect()
}

fn assert_partition_matches(input: &[u8], fragments: &[&[u8]]) {
    let mut hasher = HighwayHasher::new(&KEY);
    for fragment in fragments {
        hasher.append(fragment);
    }
    assert_eq!(
        hasher.finalize64(),
        highwayhash::hash64(&KEY, input),
        "64-bit mismatch, n={} fragments={:?}",
        input.len(),
        fragments.iter().map(|f| f.len()).collect::<Vec<_>>()
    );
    assert_eq!(hasher.finalize128(), highwayhash::hash128(&KEY, input));
    assert_eq!(hasher.finalize256(), highwayhash::hash256(&KEY, input));
}

// =============================================================================
// PARTITIONS
// =============================================================================

#[test]
fn three_fragment_partitions() {
    // Every (s1, s2, s3) split of n <= 128, stepping the cut points to keep
    // runtime sane; boundary splits (0 and n) are always included.
    for n in 0..=128usize {
        let input = test_input(n);
        let mut cuts1: Vec<usize> = (0..=n).step_by(7).collect();
        cuts1.push(n);
        for &s1 in &cuts1 {
            let mut cuts2: Vec<usize> = (0..=n - s1).step_by(5).collect();
            cuts2.push(n - s1);
            for &s2 in &cuts2 {
                let (a, rest) = input.split_at(s1);
                let (b, c) = rest.split_at(s2);
                assert_partition_matches(&input, &[a, b, c]);
            }
        }
    }
}

#[test]
fn single_byte_appends() {
    let input = test_input(100);
    let mut hasher = HighwayHasher::new(&KEY);
    for &byte in &input {
        hasher.append(&[byte]);
    }
    assert_eq!(hasher.finalize64(), highwayhash::hash64(&KEY, &input));
}

#[test]
fn empty_fragments_are_neutral() {
    let input = test_input(45);
    let mut hasher = HighwayHasher::new(&KEY);
    hasher.append(b"");
    hasher.append(&input[..10]);
    hasher.append(b"");
    hasher.append(&input[10..]);
    hasher.append(b"");
    assert_eq!(hasher.finalize256(), highwayhash::hash256(&KEY, &input));
}

#[test]
fn random_fragmentations() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let n = rng.random_range(0..1500);
        let mut input = vec![0u8; n];
        rng.fill(&mut input[..]);

        let mut hasher = HighwayHasher::new(&KEY);
        let mut offset = 0;
        while offset < n {
            let take = rng.random_range(1..=(n - offset).min(97));
            hasher.append(&input[offset..offset + take]);
            offset += take;
        }
        assert_eq!(
            hasher.finalize64(),
            highwayhash::hash64(&KEY, &input),
            "n={n}"
        );
        assert_eq!(hasher.finalize256(), highwayhash::hash256(&KEY, &input));
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[test]
fn finalize_then_keep_appending() {
    let input = test_input(80);
    let mut hasher = HighwayHasher::new(&KEY);
    hasher.append(&input[..50]);
    let early = hasher.finalize64();
    assert_eq!(early, highwayhash::hash64(&KEY, &input[..50]));

    hasher.append(&input[50..]);
    assert_eq!(hasher.finalize64(), highwayhash::hash64(&KEY, &input));
}

#[test]
fn clone_preserves_the_stream() {
    let input = test_input(77);
    let mut hasher = HighwayHasher::new(&KEY);
    hasher.append(&input[..33]);
    let mut forked = hasher.clone();
    hasher.append(&input[33..]);
    forked.append(&input[33..]);
    assert_eq!(hasher.finalize256(), forked.finalize256());
}
