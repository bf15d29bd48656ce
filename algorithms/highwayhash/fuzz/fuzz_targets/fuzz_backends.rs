#![no_main]

use highwayhash::kernels::portable;
use highwayhash::sip::siptree_hash_scalar;
use libfuzzer_sys::fuzz_target;

// The dispatched kernels must agree with the scalar references on every
// input, for every output width.
fuzz_target!(|data: &[u8]| {
    let key = [
        0x0706_0504_0302_0100u64,
        0x0F0E_0D0C_0B0A_0908,
        0x1716_1514_1312_1110,
        0x1F1E_1D1C_1B1A_1918,
    ];

    assert_eq!(highwayhash::hash64(&key, data), portable::hash64(&key, data));
    assert_eq!(
        highwayhash::hash128(&key, data),
        portable::hash128(&key, data)
    );
    assert_eq!(
        highwayhash::hash256(&key, data),
        portable::hash256(&key, data)
    );
    assert_eq!(
        highwayhash::siptree_hash(&key, data),
        siptree_hash_scalar(&key, data)
    );
});
