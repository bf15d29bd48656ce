//! C-API bindings.
//!
//! Exposes the hashes to C/C++ with pointer checks and panic boundaries.
//! The `HighwayHash64_Target*` and `*SipTreeHashC` names follow the original
//! C symbol conventions so existing clients keep linking; the per-target
//! entries verify their feature group and fall back to the dispatcher rather
//! than execute unsupported code.
//!
//! Every entry point null-checks its pointers and wraps the call in
//! `catch_unwind` so no panic crosses the `extern "C"` boundary. Functions
//! returning a bare digest report failure as `0`; the out-pointer functions
//! return `0` on success, `-1` on a null pointer, and `-2` if an internal
//! panic was caught.

#![allow(unsafe_code)]
#![allow(non_snake_case)]

use std::slice;

#[cfg(target_arch = "x86_64")]
use crate::engine::caps;
use crate::kernels;
use crate::streaming::HighwayHasher;
use crate::types::Key;
use crate::{hash128, hash256, hash64, siphash, siphash13, siptree_hash};

unsafe fn key4<'a>(key_ptr: *const u64) -> &'a Key {
    &*key_ptr.cast::<Key>()
}

// =============================================================================
// ONE-SHOT API
// =============================================================================

/// Compute the 64-bit HighwayHash with the best kernel for this CPU.
///
/// # Returns
/// The digest, or `0` if a pointer is null or an internal panic was caught.
///
/// # Safety
/// - `key_ptr` must point to four u64 values
/// - `bytes_ptr` must be valid for `size` bytes (may be null only if `size == 0`)
#[no_mangle]
pub unsafe extern "C" fn HighwayHash64(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        hash64(key4(key_ptr), bytes)
    })
    .unwrap_or(0)
}

/// 64-bit HighwayHash, portable kernel.
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// As [`HighwayHash64`].
#[no_mangle]
pub unsafe extern "C" fn HighwayHash64_TargetPortable(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        kernels::portable::hash64(key4(key_ptr), bytes)
    })
    .unwrap_or(0)
}

/// 64-bit HighwayHash, SSE4.1 kernel. Falls back to the dispatcher if the
/// SSE4.1 group is unsupported.
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// As [`HighwayHash64`].
#[cfg(target_arch = "x86_64")]
#[no_mangle]
pub unsafe extern "C" fn HighwayHash64_TargetSSE41(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        if caps::supported() & caps::GROUP_SSE41 == caps::GROUP_SSE41 {
            // SAFETY: SSE4.1 group verified above.
            return kernels::sse41::hash64(key4(key_ptr), bytes);
        }
        hash64(key4(key_ptr), bytes)
    })
    .unwrap_or(0)
}

/// 64-bit HighwayHash, AVX2 kernel. Falls back to the dispatcher if the AVX2
/// group is unsupported.
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// As [`HighwayHash64`].
#[cfg(target_arch = "x86_64")]
#[no_mangle]
pub unsafe extern "C" fn HighwayHash64_TargetAVX2(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        if caps::supported() & caps::GROUP_AVX2 == caps::GROUP_AVX2 {
            // SAFETY: AVX2 group verified above.
            return kernels::avx2::hash64(key4(key_ptr), bytes);
        }
        hash64(key4(key_ptr), bytes)
    })
    .unwrap_or(0)
}

/// Compute the 128-bit HighwayHash into `out_ptr`.
///
/// # Returns
/// - `0`: success
/// - `-1`: null pointer
/// - `-2`: panic
///
/// # Safety
/// - `key_ptr` must point to four u64 values
/// - `bytes_ptr` must be valid for `size` bytes
/// - `out_ptr` must be valid for two writable u64 values
#[no_mangle]
pub unsafe extern "C" fn highwayhash128(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
    out_ptr: *mut u64,
) -> i32 {
    if key_ptr.is_null() || bytes_ptr.is_null() || out_ptr.is_null() {
        return -1;
    }
    let result = std::panic::catch_unwind(|| {
        let bytes = slice::from_raw_parts(bytes_ptr, size as usize);
        let digest = hash128(key4(key_ptr), bytes);
        std::ptr::copy_nonoverlapping(digest.as_ptr(), out_ptr, 2);
    });
    match result {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// Compute the 256-bit HighwayHash into `out_ptr`.
///
/// # Returns
/// As [`highwayhash128`].
///
/// # Safety
/// As [`highwayhash128`], with four writable u64 values at `out_ptr`.
#[no_mangle]
pub unsafe extern "C" fn highwayhash256(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
    out_ptr: *mut u64,
) -> i32 {
    if key_ptr.is_null() || bytes_ptr.is_null() || out_ptr.is_null() {
        return -1;
    }
    let result = std::panic::catch_unwind(|| {
        let bytes = slice::from_raw_parts(bytes_ptr, size as usize);
        let digest = hash256(key4(key_ptr), bytes);
        std::ptr::copy_nonoverlapping(digest.as_ptr(), out_ptr, 4);
    });
    match result {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

// =============================================================================
// SIPHASH API
// =============================================================================

/// SipHash-2-4.
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// - `key_ptr` must point to two u64 values
/// - `bytes_ptr` must be valid for `size` bytes (may be null only if `size == 0`)
#[no_mangle]
pub unsafe extern "C" fn SipHashC(key_ptr: *const u64, bytes_ptr: *const u8, size: u64) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        siphash(&*key_ptr.cast::<[u64; 2]>(), bytes)
    })
    .unwrap_or(0)
}

/// SipHash-1-3.
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// As [`SipHashC`].
#[no_mangle]
pub unsafe extern "C" fn SipHash13C(key_ptr: *const u64, bytes_ptr: *const u8, size: u64) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        siphash13(&*key_ptr.cast::<[u64; 2]>(), bytes)
    })
    .unwrap_or(0)
}

/// j-lanes SipTreeHash (best kernel).
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// - `key_ptr` must point to four u64 values
/// - `bytes_ptr` must be valid for `size` bytes (may be null only if `size == 0`)
#[no_mangle]
pub unsafe extern "C" fn SipTreeHashC(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        siptree_hash(key4(key_ptr), bytes)
    })
    .unwrap_or(0)
}

/// j-lanes SipTreeHash, scalar reference.
///
/// # Returns
/// As [`HighwayHash64`].
///
/// # Safety
/// As [`SipTreeHashC`].
#[no_mangle]
pub unsafe extern "C" fn ScalarSipTreeHashC(
    key_ptr: *const u64,
    bytes_ptr: *const u8,
    size: u64,
) -> u64 {
    if key_ptr.is_null() || (bytes_ptr.is_null() && size != 0) {
        return 0;
    }
    std::panic::catch_unwind(|| {
        let bytes = if size == 0 {
            &[]
        } else {
            slice::from_raw_parts(bytes_ptr, size as usize)
        };
        crate::sip::siptree_hash_scalar(key4(key_ptr), bytes)
    })
    .unwrap_or(0)
}

// =============================================================================
// STREAMING API
// =============================================================================

/// Opaque streaming hasher handle for C.
pub struct HighwayHashCat(HighwayHasher);

/// Create a new streaming hasher. Returns null if `key_ptr` is null or
/// construction panicked. Caller must free with [`highwayhash_cat_free`]
/// (finalizing does not consume the handle).
///
/// # Safety
/// `key_ptr` must point to four u64 values.
#[no_mangle]
pub unsafe extern "C" fn highwayhash_cat_new(key_ptr: *const u64) -> *mut HighwayHashCat {
    if key_ptr.is_null() {
        return std::ptr::null_mut();
    }
    std::panic::catch_unwind(|| {
        Box::into_raw(Box::new(HighwayHashCat(HighwayHasher::new(key4(key_ptr)))))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Append a fragment.
///
/// # Returns
/// - `0`: success
/// - `-1`: null pointer
/// - `-2`: panic
///
/// # Safety
/// - `state_ptr` must come from [`highwayhash_cat_new`]
/// - `bytes_ptr` must be valid for `size` bytes
#[no_mangle]
pub unsafe extern "C" fn highwayhash_cat_append(
    state_ptr: *mut HighwayHashCat,
    bytes_ptr: *const u8,
    size: u64,
) -> i32 {
    if state_ptr.is_null() || bytes_ptr.is_null() {
        return -1;
    }
    let result = std::panic::catch_unwind(|| {
        let hasher = &mut (*state_ptr).0;
        hasher.append(slice::from_raw_parts(bytes_ptr, size as usize));
    });
    match result {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// 64-bit digest of everything appended so far, written to `out_ptr`. The
/// handle stays valid and may keep appending.
///
/// # Returns
/// As [`highwayhash_cat_append`].
///
/// # Safety
/// - `state_ptr` must come from [`highwayhash_cat_new`]
/// - `out_ptr` must be valid for one writable u64 value
#[no_mangle]
pub unsafe extern "C" fn highwayhash_cat_finalize64(
    state_ptr: *const HighwayHashCat,
    out_ptr: *mut u64,
) -> i32 {
    if state_ptr.is_null() || out_ptr.is_null() {
        return -1;
    }
    let result = std::panic::catch_unwind(|| {
        let digest = (*state_ptr).0.finalize64();
        out_ptr.write(digest);
    });
    match result {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// 128-bit digest of everything appended so far.
///
/// # Returns
/// As [`highwayhash_cat_append`].
///
/// # Safety
/// - `state_ptr` must come from [`highwayhash_cat_new`]
/// - `out_ptr` must be valid for two writable u64 values
#[no_mangle]
pub unsafe extern "C" fn highwayhash_cat_finalize128(
    state_ptr: *const HighwayHashCat,
    out_ptr: *mut u64,
) -> i32 {
    if state_ptr.is_null() || out_ptr.is_null() {
        return -1;
    }
    let result = std::panic::catch_unwind(|| {
        let digest = (*state_ptr).0.finalize128();
        std::ptr::copy_nonoverlapping(digest.as_ptr(), out_ptr, 2);
    });
    match result {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// 256-bit digest of everything appended so far.
///
/// # Returns
/// As [`highwayhash_cat_append`].
///
/// # Safety
/// - `state_ptr` must come from [`highwayhash_cat_new`]
/// - `out_ptr` must be valid for four writable u64 values
#[no_mangle]
pub unsafe extern "C" fn highwayhash_cat_finalize256(
    state_ptr: *const HighwayHashCat,
    out_ptr: *mut u64,
) -> i32 {
    if state_ptr.is_null() || out_ptr.is_null() {
        return -1;
    }
    let result = std::panic::catch_unwind(|| {
        let digest = (*state_ptr).0.finalize256();
        std::ptr::copy_nonoverlapping(digest.as_ptr(), out_ptr, 4);
    });
    match result {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// Free a streaming hasher.
///
/// # Safety
/// `state_ptr` must come from [`highwayhash_cat_new`], or be null.
#[no_mangle]
pub unsafe extern "C" fn highwayhash_cat_free(state_ptr: *mut HighwayHashCat) {
    if !state_ptr.is_null() {
        drop(Box::from_raw(state_ptr));
    }
}

/// Name of the active backend as a static, null-terminated C string. Must not
/// be freed by the caller.
#[no_mangle]
pub extern "C" fn highwayhash_backend_name() -> *const std::os::raw::c_char {
    let name: &'static str = match crate::active_backend() {
        "avx2" => "avx2\0",
        "sse41" => "sse41\0",
        _ => "portable\0",
    };
    name.as_ptr().cast()
}
