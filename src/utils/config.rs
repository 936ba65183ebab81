//! Application configuration constants.
//! Tuning and thresholds in one place.

// ---- Hashing ----

/// Hashing I/O thresholds and defaults.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which content hashing uses memory-mapped I/O (bytes). 100 MB.
    /// The digest is identical to the streamed path: blake3 is block-size independent.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Default block size for streaming file contents into the hasher (bytes). 1 MB.
    pub const DEFAULT_CONTENT_BLOCK_SIZE: usize = 1024 * 1024;
    /// Default block size for path-string hashing. Interface symmetry only;
    /// strings are hashed whole.
    pub const DEFAULT_PATH_BLOCK_SIZE: usize = 10 * 1024;
}

// ---- Pipeline channels ----

/// Triple and record channel capacity. Bounded so a fast walk cannot outrun the
/// fingerprint workers without limit; large enough that the walk rarely blocks.
pub const STREAMING_CHANNEL_CAP: usize = 50_000;

// ---- Database ----

/// Progress-log interval (rows) while staging the batch transaction.
pub const DB_INSERT_BATCH_SIZE: usize = 1000;

// ---- Timestamps ----

/// Fixed timestamp format for created/modified columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";
