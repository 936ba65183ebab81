//! Path, name, and timestamp utilities shared by the pipeline.

use chrono::{DateTime, Local};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use crate::utils::config::TIMESTAMP_FORMAT;

/// Normalize a path for storage and hashing: forward slashes on every platform.
pub fn path_to_db_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    if s.contains('\\') {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Directory path of `dir` relative to `base`, `"."` when `dir` is `base` itself.
pub fn relative_dir_of(dir: &Path, base: &Path) -> Option<String> {
    let rel = dir.strip_prefix(base).ok()?;
    if rel.as_os_str().is_empty() {
        Some(".".to_string())
    } else {
        Some(path_to_db_string(rel))
    }
}

/// Extension without the dot; empty for names with no extension. A leading dot
/// alone (`.bashrc`) is not an extension.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
        _ => String::new(),
    }
}

/// Mime hint for common extensions; None when unknown. A hint only, never
/// derived from file contents.
pub fn mime_hint(extension: &str) -> Option<String> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "txt" | "log" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Fixed-format timestamp for a filesystem time.
pub fn format_timestamp(time: SystemTime) -> String {
    let dt: DateTime<Local> = time.into();
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// (created, modified) timestamps for a file. Creation falls back to the
/// modification time on filesystems without a birth time.
pub fn timestamps_of(meta: &Metadata) -> (String, String) {
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let created = meta.created().unwrap_or(modified);
    (format_timestamp(created), format_timestamp(modified))
}
