//! Load and validate a replidex settings file (TOML) into a flat [`RunConfig`].
//!
//! The core never sees raw settings: roots are deduplicated and checked here,
//! block sizes validated, store paths defaulted. Library callers may skip this
//! and build a [`RunConfig`] directly.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::RunConfig;
use crate::utils::config::HashingConsts;

#[derive(Debug, Deserialize)]
struct SettingsFile {
    paths: PathsSection,
    #[serde(default)]
    hashing: HashingSection,
    #[serde(default)]
    stores: StoresSection,
    #[serde(default)]
    pipeline: PipelineSection,
}

#[derive(Debug, Deserialize)]
struct PathsSection {
    roots: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct HashingSection {
    content_block_size: Option<usize>,
    path_block_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct StoresSection {
    private_db: Option<PathBuf>,
    public_db: Option<PathBuf>,
    evaluation_db: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PipelineSection {
    workers: Option<usize>,
}

/// Read `path`, parse, validate, and return the flat run configuration.
pub fn load_settings(path: &Path) -> Result<RunConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    let file: SettingsFile = toml::from_str(&raw)
        .with_context(|| format!("parse settings file {}", path.display()))?;

    let roots = validate_roots(&file.paths.roots)?;

    let content_block_size = file
        .hashing
        .content_block_size
        .unwrap_or(HashingConsts::DEFAULT_CONTENT_BLOCK_SIZE);
    let path_block_size = file
        .hashing
        .path_block_size
        .unwrap_or(HashingConsts::DEFAULT_PATH_BLOCK_SIZE);
    if content_block_size == 0 {
        bail!("[hashing] content_block_size must be a positive number of bytes");
    }
    if path_block_size == 0 {
        bail!("[hashing] path_block_size must be a positive number of bytes");
    }
    if let Some(0) = file.pipeline.workers {
        bail!("[pipeline] workers must be at least 1 when set");
    }

    Ok(RunConfig {
        roots,
        content_block_size,
        path_block_size,
        private_db: file
            .stores
            .private_db
            .unwrap_or_else(|| PathBuf::from("private_index.sqlite")),
        public_db: file
            .stores
            .public_db
            .unwrap_or_else(|| PathBuf::from("public_index.sqlite")),
        evaluation_db: file.stores.evaluation_db,
        workers: file.pipeline.workers,
    })
}

/// Deduplicate roots (order preserved) and drop anything that is not an
/// existing directory, with a warning. At least one root must survive.
fn validate_roots(configured: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut roots = Vec::new();
    for root in configured {
        if !seen.insert(root.clone()) {
            continue;
        }
        if !root.is_dir() {
            log::warn!("{} is not a readable directory, skipping", root.display());
            continue;
        }
        roots.push(root.clone());
    }
    if roots.is_empty() {
        bail!("no valid root directories in [paths] roots");
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_block_size() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        std::fs::write(
            &settings,
            format!(
                "[paths]\nroots = [\"{}\"]\n[hashing]\ncontent_block_size = 0\n",
                dir.path().display()
            ),
        )
        .unwrap();
        let err = load_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("content_block_size"));
    }

    #[test]
    fn rejects_zero_workers() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        std::fs::write(
            &settings,
            format!(
                "[paths]\nroots = [\"{}\"]\n[pipeline]\nworkers = 0\n",
                dir.path().display()
            ),
        )
        .unwrap();
        let err = load_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        std::fs::write(
            &settings,
            format!("[paths]\nroots = [\"{}\"]\n", dir.path().display()),
        )
        .unwrap();
        let cfg = load_settings(&settings).unwrap();
        assert_eq!(
            cfg.content_block_size,
            HashingConsts::DEFAULT_CONTENT_BLOCK_SIZE
        );
        assert_eq!(cfg.path_block_size, HashingConsts::DEFAULT_PATH_BLOCK_SIZE);
        assert!(cfg.evaluation_db.is_none());
        assert!(cfg.workers.is_none());
    }

    #[test]
    fn drops_missing_roots_and_dedupes() {
        let dir = std::env::temp_dir();
        let roots = vec![
            dir.clone(),
            dir.clone(),
            PathBuf::from("/definitely/not/here"),
        ];
        let valid = validate_roots(&roots).unwrap();
        assert_eq!(valid, vec![dir]);
    }

    #[test]
    fn all_roots_invalid_is_an_error() {
        let roots = vec![PathBuf::from("/definitely/not/here")];
        assert!(validate_roots(&roots).is_err());
    }
}
