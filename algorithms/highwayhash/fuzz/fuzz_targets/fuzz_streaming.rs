#![no_main]

use highwayhash::HighwayHasher;
use libfuzzer_sys::fuzz_target;

// Streaming over arbitrary fragmentations must equal the one-shot hash.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    // Chunk size from the first byte (1 to 255); the rest is the payload.
    let chunk_size = (data[0] as usize % 255) + 1;
    let payload = &data[1..];

    let key = [0x0706_0504_0302_0100u64, 0x0F0E_0D0C_0B0A_0908, 0, 0xFFFF];
    let reference64 = highwayhash::hash64(&key, payload);
    let reference256 = highwayhash::hash256(&key, payload);

    let mut hasher = HighwayHasher::new(&key);
    for chunk in payload.chunks(chunk_size) {
        hasher.append(chunk);
    }

    assert_eq!(
        hasher.finalize64(),
        reference64,
        "streaming and one-shot 64-bit results differ"
    );
    assert_eq!(
        hasher.finalize256(),
        reference256,
        "streaming and one-shot 256-bit results differ"
    );
});
