//! Pipeline components: scanner walk, fingerprint worker pool, orchestration.

pub mod context;
pub mod orchestrator;
pub mod walk;
pub mod workers;

pub use context::{PipelineChannels, PipelineHandles, SkippedPaths, WalkTotals};
pub use orchestrator::{collect_records, effective_workers, run_pipeline};
pub use walk::spawn_walk_thread;
pub use workers::{build_record, spawn_fingerprint_workers};
