//! Hash command.
//!
//! File hashing with automatic parallelization via Rayon. HighwayHash
//! variants stream through the incremental hasher; the SipHash variants have
//! no streaming state and buffer the file.

use anyhow::{Context, Result};
use clap::ValueEnum;
use highwayhash::{HighwayHasher, Key};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Algorithm {
    /// 64-bit HighwayHash
    Highway64,
    /// 128-bit HighwayHash
    Highway128,
    /// 256-bit HighwayHash
    Highway256,
    /// SipHash-2-4 (uses the first 128 key bits)
    Siphash,
    /// SipHash-1-3 (uses the first 128 key bits)
    Siphash13,
    /// j-lanes SipTreeHash
    Siptree,
}

// =============================================================================
// KEY PARSING
// =============================================================================

/// Parse a 64-hex-char key into little-endian u64 lanes; `None` is the
/// all-zero key.
pub fn parse_key(key: Option<&str>) -> Result<Key> {
    let Some(hex_key) = key else {
        return Ok([0; 4]);
    };
    let bytes = hex::decode(hex_key).context("Key must be hex")?;
    anyhow::ensure!(
        bytes.len() == 32,
        "Key must be 32 bytes (64 hex chars), got {}",
        bytes.len()
    );
    let mut lanes = [0u64; 4];
    for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *lane = u64::from_le_bytes(word);
    }
    Ok(lanes)
}

// =============================================================================
// PER-FILE HASHING
// =============================================================================

enum FileHasher {
    /// HighwayHash variants: constant-memory streaming.
    Streaming(HighwayHasher, Algorithm),
    /// SipHash variants: whole-file buffer.
    Buffered(Vec<u8>, Key, Algorithm),
}

impl FileHasher {
    fn new(algo: Algorithm, key: &Key) -> Self {
        match algo {
            Algorithm::Highway64 | Algorithm::Highway128 | Algorithm::Highway256 => {
                Self::Streaming(HighwayHasher::new(key), algo)
            }
            Algorithm::Siphash | Algorithm::Siphash13 | Algorithm::Siptree => {
                Self::Buffered(Vec::new(), *key, algo)
            }
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Streaming(hasher, _) => hasher.append(data),
            Self::Buffered(buffer, _, _) => buffer.extend_from_slice(data),
        }
    }

    fn finalize(self) -> String {
        let mut bytes = Vec::with_capacity(32);
        match self {
            Self::Streaming(hasher, algo) => match algo {
                Algorithm::Highway64 => bytes.extend_from_slice(&hasher.finalize64().to_le_bytes()),
                Algorithm::Highway128 => {
                    for lane in hasher.finalize128() {
                        bytes.extend_from_slice(&lane.to_le_bytes());
                    }
                }
                _ => {
                    for lane in hasher.finalize256() {
                        bytes.extend_from_slice(&lane.to_le_bytes());
                    }
                }
            },
            Self::Buffered(buffer, key, algo) => {
                let sip_key = [key[0], key[1]];
                let digest = match algo {
                    Algorithm::Siphash => highwayhash::siphash(&sip_key, &buffer),
                    Algorithm::Siphash13 => highwayhash::siphash13(&sip_key, &buffer),
                    _ => highwayhash::siptree_hash(&key, &buffer),
                };
                bytes.extend_from_slice(&digest.to_le_bytes());
            }
        }
        hex::encode(bytes)
    }
}

/// Hash a single file, streaming through a 128 KB buffer.
pub fn hash_one_file(path: &Path, algo: Algorithm, key: &Key) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;

    let mut hasher = FileHasher::new(algo, key);
    let mut buffer = vec![0u8; 128 * 1024];

    loop {
        let n = std::io::Read::read(&mut file, &mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

// =============================================================================
// HASH FILES
// =============================================================================

/// Hash files (Rayon parallelizes across files).
pub fn hash_files(files: &[PathBuf], algo: Algorithm, key: &Key) -> Result<()> {
    let results = Mutex::new(Vec::with_capacity(files.len()));
    let errors = Mutex::new(Vec::new());

    files.par_iter().for_each(|file_path| {
        match hash_one_file(file_path, algo, key) {
            Ok(hex_hash) => {
                results.lock().unwrap().push((file_path.clone(), hex_hash));
            }
            Err(e) => {
                errors.lock().unwrap().push((file_path.clone(), e));
            }
        }
    });

    // Print in original order.
    let mut results = results.into_inner().unwrap();
    results.sort_by_key(|(path, _)| files.iter().position(|p| p == path).unwrap_or(usize::MAX));

    for (file_path, hex_hash) in results {
        println!("{}  {}", hex_hash, file_path.display());
    }

    let errors = errors.into_inner().unwrap();
    for (file_path, error) in &errors {
        eprintln!("Error: {}: {}", file_path.display(), error);
    }

    if !errors.is_empty() {
        anyhow::bail!("Failed to hash {} file(s)", errors.len());
    }

    Ok(())
}
