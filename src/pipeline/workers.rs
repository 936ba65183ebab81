//! Fingerprint worker pool: drain the triple channel, produce one
//! [`FileRecord`] per file, failure-isolated per task.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::engine::fingerprint::Fingerprinter;
use crate::engine::tools::{extension_of, mime_hint, path_to_db_string, timestamps_of};
use crate::types::{FileRecord, ScanTriple};

use super::context::SkippedPaths;

/// One worker: receive triples until the channel closes. A per-file I/O failure
/// (file deleted between walk and read, permission denied) is recorded as a
/// skipped path and the worker moves on; tasks never share mutable state beyond
/// the skip list.
fn fingerprint_worker_loop(
    triple_rx: Receiver<ScanTriple>,
    record_tx: Sender<FileRecord>,
    fingerprinter: Fingerprinter,
    skipped: SkippedPaths,
) {
    while let Ok(triple) = triple_rx.recv() {
        match build_record(&triple, &fingerprinter) {
            Ok(record) => {
                let _ = record_tx.send(record);
            }
            Err(err) => {
                let path = triple.root.join(&triple.relative_dir).join(&triple.file_name);
                log::warn!("skipping {}: {:#}", path.display(), err);
                skipped.lock().unwrap().push((path, format!("{err:#}")));
            }
        }
    }
    drop(record_tx);
}

/// Spawn the fixed-size worker pool. Caller must drop its `record_tx` clone
/// after this so the collector sees the channel close once all workers exit.
pub fn spawn_fingerprint_workers(
    triple_rx: Receiver<ScanTriple>,
    record_tx: &Sender<FileRecord>,
    fingerprinter: Fingerprinter,
    num_workers: usize,
    skipped: &SkippedPaths,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let triple_rx = triple_rx.clone();
            let record_tx = record_tx.clone();
            let skipped = skipped.clone();
            thread::spawn(move || {
                fingerprint_worker_loop(triple_rx, record_tx, fingerprinter, skipped)
            })
        })
        .collect()
}

/// Compute one file's record: metadata, content hash, and the four path-derived
/// fingerprints.
pub fn build_record(triple: &ScanTriple, fingerprinter: &Fingerprinter) -> Result<FileRecord> {
    let dir = if triple.relative_dir == "." {
        triple.root.clone()
    } else {
        triple.root.join(&triple.relative_dir)
    };
    let abs_path = dir.join(&triple.file_name);

    let meta = std::fs::metadata(&abs_path).context("read file metadata")?;
    if !meta.is_file() {
        anyhow::bail!("not a regular file");
    }
    let file_size = meta.len();
    let (created_time, modified_time) = timestamps_of(&meta);

    let root_path = path_to_db_string(&triple.root);
    let absolute_path = join_path_identity(&root_path, &triple.relative_dir, &triple.file_name);

    let content_hash = fingerprinter
        .hash_file_content(&abs_path, file_size)
        .context("hash file content")?;

    Ok(FileRecord {
        root_path_hash: fingerprinter.hash_path_str(&root_path),
        relative_path_hash: fingerprinter.hash_path_str(&triple.relative_dir),
        filename_hash: fingerprinter.hash_path_str(&triple.file_name),
        absolute_path_hash: fingerprinter.hash_path_str(&absolute_path),
        content_hash,
        file_extension: extension_of(&triple.file_name),
        mime_type: mime_hint(&extension_of(&triple.file_name)),
        root_path,
        relative_path: triple.relative_dir.clone(),
        file_name: triple.file_name.clone(),
        file_size,
        created_time,
        modified_time,
    })
}

/// Whole-path identity string: root, relative directory, and file name joined
/// with forward slashes (`"."` segments collapse away).
fn join_path_identity(root: &str, relative_dir: &str, file_name: &str) -> String {
    if relative_dir == "." {
        format!("{root}/{file_name}")
    } else {
        format!("{root}/{relative_dir}/{file_name}")
    }
}
