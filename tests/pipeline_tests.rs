//! End-to-end tests: scan real directories, index, evaluate, and check the
//! replica gap report.

use replidex::engine::fingerprint::Fingerprinter;
use replidex::engine::tools::path_to_db_string;
use replidex::pipeline::{SkippedPaths, collect_records, effective_workers, spawn_fingerprint_workers};
use replidex::{RunConfig, ScanTriple, evaluate_replicas, index_replicas};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn write_file(dir: &Path, rel: &str, bytes: &[u8]) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

fn config_for(base: &Path, roots: &[&Path]) -> RunConfig {
    RunConfig {
        roots: roots.iter().map(|r| r.to_path_buf()).collect(),
        content_block_size: 1024,
        path_block_size: 64,
        private_db: base.join("private_index.sqlite"),
        public_db: base.join("public_index.sqlite"),
        evaluation_db: None,
        workers: Some(2),
    }
}

#[test]
fn test_two_replica_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let root_a = tmp.path().join("a");
    let root_b = tmp.path().join("b");
    fs::create_dir_all(&root_a).unwrap();
    fs::create_dir_all(&root_b).unwrap();
    write_file(&root_a, "f1", b"x");
    write_file(&root_a, "f2", b"y");
    write_file(&root_b, "f1", b"x");

    let cfg = config_for(tmp.path(), &[&root_a, &root_b]);
    let summary = index_replicas(&cfg).unwrap();
    assert_eq!(summary.files_indexed, 3);
    assert_eq!(summary.roots_scanned, 2);
    assert_eq!(summary.files_skipped, 0);

    let report = evaluate_replicas(&cfg).unwrap();
    assert_eq!(report.total_indexed, 3);
    assert_eq!(report.unique_contents, 2);
    assert_eq!(report.unique_locations, 2);
    assert_eq!(report.expected_rows(), 4);
    assert_eq!(report.missing.len(), 1);

    // The gap is root B's top-level directory lacking content "y".
    let fp = Fingerprinter::new(cfg.content_block_size, cfg.path_block_size);
    let canonical_b = root_b.canonicalize().unwrap();
    let row = &report.missing[0];
    assert_eq!(row.root_path_hash, fp.hash_path_str(&path_to_db_string(&canonical_b)));
    assert_eq!(row.relative_path_hash, fp.hash_path_str("."));
    assert_eq!(row.content_hash, fp.hash_path_str("y"));
}

#[test]
fn test_complete_replicas_report_nothing_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let root_a = tmp.path().join("a");
    let root_b = tmp.path().join("b");
    write_file(&root_a, "d/f1", b"one");
    write_file(&root_a, "d/f2", b"two");
    write_file(&root_b, "d/f1", b"one");
    write_file(&root_b, "d/f2", b"two");

    let cfg = config_for(tmp.path(), &[&root_a, &root_b]);
    index_replicas(&cfg).unwrap();
    let report = evaluate_replicas(&cfg).unwrap();

    assert_eq!(report.unique_contents, 2);
    // One location per (root, relative dir) pair: (a, d) and (b, d).
    assert_eq!(report.unique_locations, 2);
    assert!(report.missing.is_empty());
}

#[test]
fn test_empty_root_contributes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("empty");
    fs::create_dir_all(&root).unwrap();

    let cfg = config_for(tmp.path(), &[&root]);
    let summary = index_replicas(&cfg).unwrap();
    assert_eq!(summary.files_indexed, 0);

    let report = evaluate_replicas(&cfg).unwrap();
    assert_eq!(report.total_indexed, 0);
    assert_eq!(report.unique_contents, 0);
    assert_eq!(report.unique_locations, 0);
    assert!(report.missing.is_empty());
}

#[test]
fn test_vanished_file_is_skipped_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("r");
    write_file(&root, "present", b"data");
    let root = root.canonicalize().unwrap();

    // Feed the worker pool directly: one real file and one that was deleted
    // between enumeration and read.
    let (triple_tx, triple_rx) = crossbeam_channel::bounded::<ScanTriple>(8);
    let (record_tx, record_rx) = crossbeam_channel::bounded(8);
    let skipped: SkippedPaths = Arc::new(Mutex::new(Vec::new()));
    let fp = Fingerprinter::new(1024, 64);
    let handles = spawn_fingerprint_workers(triple_rx, &record_tx, fp, 2, &skipped);
    drop(record_tx);

    for name in ["present", "vanished"] {
        triple_tx
            .send(ScanTriple {
                root: root.clone(),
                relative_dir: ".".to_string(),
                file_name: name.to_string(),
            })
            .unwrap();
    }
    drop(triple_tx);

    let records: Vec<_> = record_rx.iter().collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // The surviving file is fingerprinted; the vanished one becomes a
    // diagnostic, never an abort.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name, "present");
    assert_eq!(records[0].content_hash, fp.hash_path_str("data"));

    let skipped = skipped.lock().unwrap();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].0.ends_with("vanished"));
    assert!(
        skipped[0].1.contains("read file metadata"),
        "diagnostic should name the failed step: {}",
        skipped[0].1
    );
}

#[test]
fn test_evaluate_without_index_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("r");
    fs::create_dir_all(&root).unwrap();

    let cfg = config_for(tmp.path(), &[&root]);
    let err = evaluate_replicas(&cfg).unwrap_err();
    assert!(
        err.to_string().contains("run indexing first"),
        "unexpected error: {err:#}"
    );
}

#[test]
fn test_rejected_evaluation_leaves_no_evaluation_db() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("r");
    fs::create_dir_all(&root).unwrap();

    let mut cfg = config_for(tmp.path(), &[&root]);
    let eval_db = tmp.path().join("evaluation.sqlite");
    cfg.evaluation_db = Some(eval_db.clone());

    // No index exists, so the run is rejected before anything is opened.
    assert!(evaluate_replicas(&cfg).is_err());
    assert!(!eval_db.exists());
}

#[test]
fn test_reindex_replaces_prior_state() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("r");
    write_file(&root, "f1", b"old");

    let cfg = config_for(tmp.path(), &[&root]);
    index_replicas(&cfg).unwrap();

    // Second run over changed content replaces the first entirely.
    fs::remove_file(root.join("f1")).unwrap();
    write_file(&root, "f2", b"new");
    index_replicas(&cfg).unwrap();

    let report = evaluate_replicas(&cfg).unwrap();
    assert_eq!(report.total_indexed, 1);
    assert_eq!(report.unique_contents, 1);
    let fp = Fingerprinter::new(cfg.content_block_size, cfg.path_block_size);
    assert!(report.missing.is_empty());
    // The surviving content is "new", not "old".
    assert_ne!(fp.hash_path_str("old"), fp.hash_path_str("new"));
}

#[test]
fn test_collect_records_zero_byte_and_nested() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("r");
    write_file(&root, "empty.bin", b"");
    write_file(&root, "deep/nested/file.txt", b"payload");

    let canonical = root.canonicalize().unwrap();
    let fp = Fingerprinter::new(1024, 64);
    let (records, totals, skipped) =
        collect_records(vec![canonical], fp, effective_workers(Some(2))).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(totals.files, 2);
    assert_eq!(skipped, 0);

    let empty = records.iter().find(|r| r.file_name == "empty.bin").unwrap();
    assert_eq!(empty.file_size, 0);
    assert_eq!(empty.content_hash, fp.hash_path_str(""));
    assert_eq!(empty.relative_path, ".");

    let nested = records.iter().find(|r| r.file_name == "file.txt").unwrap();
    assert_eq!(nested.relative_path, "deep/nested");
    assert_eq!(nested.file_extension, "txt");
    assert_eq!(nested.mime_type.as_deref(), Some("text/plain"));
    assert_eq!(nested.content_hash, fp.hash_path_str("payload"));
}
