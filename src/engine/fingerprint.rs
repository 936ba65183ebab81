//! File and path-string fingerprinting.

use anyhow::Result;
use blake3::Hasher;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::types::Digest;
use crate::utils::config::HashingConsts;

/// Computes all fingerprints for a run. Holds the two configured block sizes so
/// every worker hashes identically.
#[derive(Clone, Copy, Debug)]
pub struct Fingerprinter {
    content_block_size: usize,
    /// Carried for interface symmetry with content hashing. Path strings are
    /// hashed whole, never streamed, so this value does not affect any digest.
    #[allow(dead_code)]
    path_block_size: usize,
}

impl Fingerprinter {
    pub fn new(content_block_size: usize, path_block_size: usize) -> Self {
        Self {
            content_block_size,
            path_block_size,
        }
    }

    /// Hash a file's byte stream. Reads in `content_block_size` blocks; files
    /// above the mmap threshold are memory-mapped instead. Both paths feed one
    /// incremental hasher, so the digest depends only on the byte stream, never
    /// on the block size. Empty files produce the (well-defined) empty-input digest.
    pub fn hash_file_content(&self, path: &Path, size: u64) -> Result<Digest> {
        let file = File::open(path)?;
        let mut hasher = Hasher::new();

        if size > HashingConsts::HASH_MMAP_THRESHOLD {
            let mmap = unsafe { Mmap::map(&file)? };
            hasher.update(&mmap);
        } else {
            let mut reader = std::io::BufReader::with_capacity(self.content_block_size, file);
            let mut buffer = vec![0u8; self.content_block_size];
            loop {
                let n = reader.read(&mut buffer)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buffer[..n]);
            }
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Hash the UTF-8 encoding of a path-derived string (root, relative
    /// directory, or file name), whole.
    pub fn hash_path_str(&self, s: &str) -> Digest {
        let mut hasher = Hasher::new();
        hasher.update(s.as_bytes());
        *hasher.finalize().as_bytes()
    }
}

/// Render a digest as lowercase hex for reports and logs.
pub fn digest_hex(digest: &Digest) -> String {
    blake3::Hash::from_bytes(*digest).to_hex().to_string()
}
