//! Pipeline orchestration: wire the walk thread to the worker pool, collect
//! records behind a completion barrier.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::engine::fingerprint::Fingerprinter;
use crate::types::FileRecord;

use super::context::{PipelineHandles, WalkTotals, create_pipeline_channels};
use super::walk::spawn_walk_thread;
use super::workers::spawn_fingerprint_workers;

/// Worker count for a run: configured value, otherwise the rayon thread count.
pub fn effective_workers(configured: Option<usize>) -> usize {
    configured
        .unwrap_or_else(rayon::current_num_threads)
        .max(1)
}

/// Start the walk + fingerprint pipeline over `roots`. Caller drains
/// `record_rx` and must join `walk_handle` and `worker_handles` when done.
pub fn run_pipeline(
    roots: Vec<PathBuf>,
    fingerprinter: Fingerprinter,
    num_workers: usize,
) -> PipelineHandles {
    let channels = create_pipeline_channels();

    let walk_handle = spawn_walk_thread(
        channels.triple_tx,
        roots,
        channels.skipped.clone(),
    );
    let worker_handles = spawn_fingerprint_workers(
        channels.triple_rx,
        &channels.record_tx,
        fingerprinter,
        num_workers,
        &channels.skipped,
    );

    // Dropping the last sender closes the record channel once workers exit.
    drop(channels.record_tx);

    PipelineHandles {
        record_rx: channels.record_rx,
        walk_handle,
        worker_handles,
        skipped: channels.skipped,
    }
}

/// Collect every record for a run. The barrier: the channel drains only after
/// all workers dropped their senders, and walk + workers are joined before
/// returning, so every submitted file has either produced a record or a skip
/// diagnostic. Returns (records, walk totals, skipped count).
pub fn collect_records(
    roots: Vec<PathBuf>,
    fingerprinter: Fingerprinter,
    num_workers: usize,
) -> Result<(Vec<FileRecord>, WalkTotals, usize)> {
    debug!("fingerprinting with {} workers", num_workers);
    let PipelineHandles {
        record_rx,
        walk_handle,
        worker_handles,
        skipped,
    } = run_pipeline(roots, fingerprinter, num_workers);

    let mut records = Vec::new();
    while let Ok(record) = record_rx.recv() {
        records.push(record);
    }
    debug!("record channel closed, {} records collected", records.len());

    let totals = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    for handle in worker_handles {
        let _ = handle.join();
    }

    let skipped = skipped.lock().unwrap();
    if !skipped.is_empty() {
        log::warn!("skipped {} paths during this run", skipped.len());
        for (path, reason) in skipped.iter() {
            debug!("  skipped {}: {}", path.display(), reason);
        }
    }

    Ok((records, totals, skipped.len()))
}
