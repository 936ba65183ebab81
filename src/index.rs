//! Indexing run: scan and fingerprint every replica, then rebuild both store
//! projections from the collected batch.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

use crate::engine::fingerprint::Fingerprinter;
use crate::engine::store::IndexStore;
use crate::pipeline::{collect_records, effective_workers};
use crate::types::{IndexSummary, RunConfig};

/// Index every configured replica root into the private and public stores.
///
/// Phases are strictly separated: all fingerprinting completes (walk and
/// workers joined) before the store is touched, and the batch is committed
/// before this returns — evaluation may only run after that commit.
pub fn index_replicas(cfg: &RunConfig) -> Result<IndexSummary> {
    let roots = canonicalize_roots(&cfg.roots)?;
    let fingerprinter = Fingerprinter::new(cfg.content_block_size, cfg.path_block_size);
    let num_workers = effective_workers(cfg.workers);

    let started = Instant::now();
    let (records, totals, skipped) = collect_records(roots, fingerprinter, num_workers)?;
    debug!(
        "fingerprint phase: {} records from {} files in {} directories ({:?})",
        records.len(),
        totals.files,
        totals.dirs,
        started.elapsed()
    );

    let started = Instant::now();
    let mut store = IndexStore::open(&cfg.private_db, &cfg.public_db)?;
    store.reset()?;
    let written = store.insert_batch(&records)?;
    debug!("store phase: {} records committed ({:?})", written, started.elapsed());

    info!(
        "indexed {} files across {} replicas ({} skipped)",
        written,
        cfg.roots.len(),
        skipped
    );

    Ok(IndexSummary {
        roots_scanned: cfg.roots.len(),
        files_indexed: written,
        dirs_seen: totals.dirs,
        files_skipped: skipped,
    })
}

/// Canonicalize roots so the stored root identifier is stable regardless of
/// how the path was spelled in the settings. Roots were validated upstream;
/// one vanishing between validation and here is still an error.
fn canonicalize_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    roots
        .iter()
        .map(|r| {
            r.canonicalize()
                .with_context(|| format!("canonicalize root {}", r.display()))
        })
        .collect()
}
