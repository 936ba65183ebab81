//! Replidex: replica directory indexer with privacy-partitioned fingerprint storage.
//!
//! Indexes one or more directory trees ("replicas") by fingerprinting every
//! regular file, persists the result into a private full-detail and a public
//! anonymized SQLite projection, and evaluates which (location, content) pairs
//! are missing from each replica.

pub mod engine;
pub mod evaluate;
pub mod index;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for the API
pub use types::*;

/// Result alias used by the public replidex API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use evaluate::evaluate_replicas;
pub use index::index_replicas;
