//! Consistency evaluation run: derive the missing-file report from the public
//! index.

use anyhow::Result;
use log::{debug, info, warn};
use std::time::Instant;

use crate::engine::evaluator::Evaluator;
use crate::engine::fingerprint::digest_hex;
use crate::types::{ConsistencyReport, RunConfig};

/// Evaluate replica completeness from the public index alone. Requires a
/// completed, committed indexing run; a stale or never-populated index is
/// rejected by the store guard.
pub fn evaluate_replicas(cfg: &RunConfig) -> Result<ConsistencyReport> {
    let mut evaluator = Evaluator::open(&cfg.public_db, cfg.evaluation_db.as_deref())?;

    let started = Instant::now();
    let report = evaluator.evaluate()?;
    debug!("evaluation: {:?}", started.elapsed());

    print_report(&report);
    Ok(report)
}

/// Report summary and one line per missing (location, content) pair.
fn print_report(report: &ConsistencyReport) {
    info!(
        "{} indexed files, {} unique contents, {} unique locations, {} expected pairs",
        report.total_indexed,
        report.unique_contents,
        report.unique_locations,
        report.expected_rows()
    );

    if report.missing.is_empty() {
        info!("every replica holds every known content");
        return;
    }

    warn!("{} missing (location, content) pairs:", report.missing.len());
    for row in &report.missing {
        warn!(
            "  root {} dir {} lacks content {}",
            short_hex(&digest_hex(&row.root_path_hash)),
            short_hex(&digest_hex(&row.relative_path_hash)),
            short_hex(&digest_hex(&row.content_hash)),
        );
    }
}

/// Abbreviated fingerprint for log lines.
fn short_hex(hex: &str) -> &str {
    &hex[..12.min(hex.len())]
}
