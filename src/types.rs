//! Public and internal types for the replidex API and pipeline.

use std::path::PathBuf;

/// Fixed-length blake3 fingerprint. Fast and content-discriminating; adversarial
/// collision resistance is not part of the contract.
pub type Digest = [u8; 32];

/// One scanner finding: a regular file located by (root, relative directory, file name).
///
/// `relative_dir` is the containing directory's path relative to `root`, forward-slash
/// normalized, `"."` for files directly under the root.
#[derive(Clone, Debug)]
pub struct ScanTriple {
    pub root: PathBuf,
    pub relative_dir: String,
    pub file_name: String,
}

/// Immutable value produced by a fingerprint worker for one file. The unit
/// exchanged between pipeline stages and the row source for both store projections.
#[derive(Clone, Debug)]
pub struct FileRecord {
    /// Scan root identifier (configured root path, canonicalized).
    pub root_path: String,
    /// Directory path from root to the containing folder (`"."` at the root).
    pub relative_path: String,
    /// File name with extension. Together with `relative_path` and `root_path`
    /// this identifies exactly one file instance.
    pub file_name: String,
    /// Extension without the dot; empty when the name has none.
    pub file_extension: String,
    /// Mime hint derived from the extension, when known.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub file_size: u64,
    /// Creation time, `%Y-%m-%d-%H:%M:%S`. Falls back to the modification time
    /// on filesystems without a birth time.
    pub created_time: String,
    /// Last modification time, `%Y-%m-%d-%H:%M:%S`.
    pub modified_time: String,

    /// Fingerprint of the file's byte stream (deduplication key).
    pub content_hash: Digest,
    /// Fingerprint of the `root_path` string.
    pub root_path_hash: Digest,
    /// Fingerprint of the `relative_path` string.
    pub relative_path_hash: Digest,
    /// Fingerprint of the `file_name` string.
    pub filename_hash: Digest,
    /// Fingerprint of root/relative/filename joined (whole-path identity).
    pub absolute_path_hash: Digest,
}

/// Flat, validated configuration for one run. Produced by the settings loader
/// (or built directly by library callers) and passed by value into the core.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Replica roots to index. Assumed to exist and be readable; the settings
    /// loader drops anything else before the core sees it.
    pub roots: Vec<PathBuf>,
    /// Block size (bytes) for streaming file contents into the hasher.
    pub content_block_size: usize,
    /// Block size for path-string hashing. Carried for interface symmetry with
    /// content hashing; strings are hashed whole.
    pub path_block_size: usize,
    /// Private (full-detail) index database.
    pub private_db: PathBuf,
    /// Public (anonymized) index database.
    pub public_db: PathBuf,
    /// Evaluation database. In-memory when not configured.
    pub evaluation_db: Option<PathBuf>,
    /// Fingerprint worker count. Defaults to the rayon thread count.
    pub workers: Option<usize>,
}

/// Per-run indexing totals.
#[derive(Clone, Debug, Default)]
pub struct IndexSummary {
    pub roots_scanned: usize,
    pub files_indexed: usize,
    pub dirs_seen: usize,
    pub files_skipped: usize,
}

/// One replica gap: a (location, content) pair present in the expected
/// structure but absent from the public index. A location is the
/// (root, relative directory) fingerprint pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingRow {
    pub root_path_hash: Digest,
    pub relative_path_hash: Digest,
    pub content_hash: Digest,
}

/// Result of a consistency evaluation over the public index.
#[derive(Clone, Debug, Default)]
pub struct ConsistencyReport {
    /// Distinct content fingerprints observed across all replicas.
    pub unique_contents: usize,
    /// Distinct (root, relative directory) location pairs.
    pub unique_locations: usize,
    /// Rows in the public index.
    pub total_indexed: usize,
    /// The anti-join result: expected (location, content) pairs with no actual row.
    pub missing: Vec<MissingRow>,
}

impl ConsistencyReport {
    /// Rows in the expected structure (locations x contents).
    pub fn expected_rows(&self) -> usize {
        self.unique_locations * self.unique_contents
    }
}
