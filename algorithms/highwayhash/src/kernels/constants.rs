//! HighwayHash kernel constants.
//!
//! The initialization vectors are "nothing up my sleeve" numbers: consecutive
//! hex digits of pi. The fourth lane of `INIT0` is chosen so that across
//! `INIT0[0..3]` each bit position has a near-even mixture of zeros and ones.
//!
//! Lane order is memory order: lane 0 is the lowest 64 bits of the 256-bit
//! register and XORs against key lane 0.

/// Input block size consumed by one state update, in bytes.
pub const PACKET_SIZE: usize = 32;

// =============================================================================
// INITIALIZATION VECTORS
// =============================================================================

pub const INIT0: [u64; 4] = [
    0xdbe6_d5d5_fe4c_ce2f,
    0xa409_3822_299f_31d0,
    0x1319_8a2e_0370_7344,
    0x243f_6a88_85a3_08d3,
];

pub const INIT1: [u64; 4] = [
    0x3bd3_9e10_cb0e_f593,
    0xc0ac_f169_b5f1_8a8c,
    0xbe54_66cf_34e9_0c6c,
    0x4528_21e6_38d0_1377,
];

// =============================================================================
// SHUFFLE CONTROLS
// =============================================================================

/// Zipper-merge byte shuffle, applied independently to each 128-bit half.
///
/// The 32x32 multiplication mixes bytes 0-7 of each 64-bit product to varying
/// degrees; in descending order of quality they are 3 4 2 5 1 6 0 7. The
/// control equalizes total quality across lanes, crosses the 64-bit lane
/// boundary within each half, and parks the worst bytes in the upper 32 bits,
/// which the next round's low-half multiplication discards.
pub const ZIPPER_HI: u64 = 0x0708_0609_0D0A_040B;
pub const ZIPPER_LO: u64 = 0x000F_010E_0502_0C03;

/// Finalization permute: 32-bit element indices, low to high. Swaps the upper
/// and lower 128-bit halves and the 32-bit halves within each 64-bit lane.
pub const PERMUTE32: [i32; 8] = [5, 4, 7, 6, 1, 0, 3, 2];
