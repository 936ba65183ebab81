//! Pipeline channels and shared state for one scan-and-fingerprint run.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::types::{FileRecord, ScanTriple};
use crate::utils::config::STREAMING_CHANNEL_CAP;

/// Paths dropped from the run with the reason, shared between walk and workers.
/// A skipped path is a diagnostic, never a pipeline abort.
pub type SkippedPaths = Arc<Mutex<Vec<(PathBuf, String)>>>;

/// Scanner totals: regular files emitted and directories traversed, across all roots.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkTotals {
    pub files: usize,
    pub dirs: usize,
}

/// Channels for the pipeline. The walk thread gets `triple_tx`; workers get
/// `triple_rx` and `record_tx`; the collector drains `record_rx`.
pub struct PipelineChannels {
    pub triple_tx: Sender<ScanTriple>,
    pub triple_rx: Receiver<ScanTriple>,
    pub record_tx: Sender<FileRecord>,
    pub record_rx: Receiver<FileRecord>,
    pub skipped: SkippedPaths,
}

/// Handles returned by `run_pipeline`: drain `record_rx`, then join walk and
/// workers. The indexing phase is complete only when every handle has joined.
pub struct PipelineHandles {
    pub record_rx: Receiver<FileRecord>,
    pub walk_handle: JoinHandle<WalkTotals>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub skipped: SkippedPaths,
}

pub fn create_pipeline_channels() -> PipelineChannels {
    let (triple_tx, triple_rx) = bounded::<ScanTriple>(STREAMING_CHANNEL_CAP);
    let (record_tx, record_rx) = bounded::<FileRecord>(STREAMING_CHANNEL_CAP);
    let skipped: SkippedPaths = Arc::new(Mutex::new(Vec::new()));

    PipelineChannels {
        triple_tx,
        triple_rx,
        record_tx,
        record_rx,
        skipped,
    }
}
