//! Scanner: one sequential walkdir pass per root, emitting a
//! (root, relative directory, file name) triple for every regular file.

use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::engine::tools::relative_dir_of;
use crate::types::ScanTriple;

use super::context::{SkippedPaths, WalkTotals};

/// Spawn the walk thread: scan every root in order, send triples, record walk
/// errors as skipped paths. Drops `triple_tx` when done so workers see the
/// channel close. Returns file/dir totals.
pub fn spawn_walk_thread(
    triple_tx: Sender<ScanTriple>,
    roots: Vec<PathBuf>,
    skipped: SkippedPaths,
) -> JoinHandle<WalkTotals> {
    thread::spawn(move || {
        let mut totals = WalkTotals::default();
        for root in &roots {
            let (files, dirs) = walk_one_root(root, &triple_tx, &skipped);
            log::debug!(
                "scanned {}: {} files in {} directories",
                root.display(),
                files,
                dirs
            );
            totals.files += files;
            totals.dirs += dirs;
        }
        drop(triple_tx);
        totals
    })
}

/// Walk a single root. Symlinked directories are not followed (cycle safety).
/// A permission error on a subtree skips that subtree with a diagnostic and the
/// walk continues; enumeration order carries no meaning downstream.
fn walk_one_root(
    root: &Path,
    triple_tx: &Sender<ScanTriple>,
    skipped: &SkippedPaths,
) -> (usize, usize) {
    let mut files = 0_usize;
    let mut dirs = 0_usize;
    for entry_result in WalkDir::new(root).follow_links(false) {
        match entry_result {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    dirs += 1;
                    continue;
                }
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(triple) = triple_for_entry(root, entry.path()) else {
                    continue;
                };
                if triple_tx.send(triple).is_err() {
                    break;
                }
                files += 1;
            }
            Err(err) => {
                log::warn!("skipping inaccessible path: {}", err);
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                skipped.lock().unwrap().push((path, err.to_string()));
            }
        }
    }
    (files, dirs)
}

/// Build the triple for a regular file under `root`, or None when the path has
/// no representable parent/name (not expected from walkdir output).
fn triple_for_entry(root: &Path, path: &Path) -> Option<ScanTriple> {
    let parent = path.parent()?;
    let relative_dir = relative_dir_of(parent, root)?;
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    Some(ScanTriple {
        root: root.to_path_buf(),
        relative_dir,
        file_name,
    })
}
