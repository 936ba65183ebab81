//! Two-tier index store: a private full-detail projection and a public
//! anonymized projection, kept consistent within one transaction.

use anyhow::{Context, Result};
use rusqlite::{Connection, ffi, params};
use std::path::Path;
use thiserror::Error;

use crate::FileRecord;
use crate::engine::tools::format_timestamp;
use crate::utils::config::DB_INSERT_BATCH_SIZE;

/// Alias under which the public database is attached to the private connection.
const PUBLIC_DB_ALIAS: &str = "pub_store";

/// Contract-level store failures that callers match on. Everything else is
/// propagated as a plain I/O or SQL error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (root_path_hash, relative_path_hash, filename_hash) key of this
    /// record already exists. Either a fingerprinting logic error or two
    /// distinct files claiming one identity; the batch is rolled back either way.
    #[error(
        "duplicate index key for '{root}' / '{relative_dir}' / '{file_name}': \
         the (root, directory, filename) fingerprint triple is already indexed"
    )]
    DuplicateKey {
        root: String,
        relative_dir: String,
        file_name: String,
    },
}

const PRIVATE_SCHEMA: &str = r#"
CREATE TABLE private_index (
    root_path          TEXT NOT NULL,
    relative_path      TEXT NOT NULL,
    file_name          TEXT NOT NULL,
    file_extension     TEXT NOT NULL,
    mime_type          TEXT,
    file_size          INTEGER NOT NULL,
    created_time       TEXT NOT NULL,
    modified_time      TEXT NOT NULL,
    content_hash       BLOB NOT NULL,
    root_path_hash     BLOB NOT NULL,
    relative_path_hash BLOB NOT NULL,
    filename_hash      BLOB NOT NULL,
    absolute_path_hash BLOB NOT NULL,
    PRIMARY KEY (root_path_hash, relative_path_hash, filename_hash)
);
"#;

// The public projection never carries a plaintext filesystem string: only
// fingerprints, size, and timestamps. This is a hard privacy boundary, not a
// convention; tests assert the column set.
const PUBLIC_SCHEMA: &str = r#"
CREATE TABLE pub_store.public_index (
    content_hash       BLOB NOT NULL,
    root_path_hash     BLOB NOT NULL,
    relative_path_hash BLOB NOT NULL,
    filename_hash      BLOB NOT NULL,
    absolute_path_hash BLOB NOT NULL,
    file_size          INTEGER NOT NULL,
    created_time       TEXT NOT NULL,
    modified_time      TEXT NOT NULL,
    PRIMARY KEY (root_path_hash, relative_path_hash, filename_hash)
);

CREATE TABLE pub_store.run_meta (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    completed_at TEXT NOT NULL,
    record_count INTEGER NOT NULL
);
"#;

/// Handle over both index projections. The public database is attached to the
/// private connection so a single transaction covers every write of a run.
pub struct IndexStore {
    conn: Connection,
}

impl IndexStore {
    /// Open (creating if absent) the private and public index databases.
    /// The default rollback journal is kept on purpose: it makes the commit
    /// spanning both attached files atomic, which WAL does not guarantee.
    pub fn open(private_db: &Path, public_db: &Path) -> Result<Self> {
        let conn = Connection::open(private_db).context("open private index database")?;
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {PUBLIC_DB_ALIAS}"),
            params![public_db.to_string_lossy()],
        )
        .context("attach public index database")?;
        Ok(Self { conn })
    }

    /// Drop and recreate both schemas. Every run starts from a clean slate;
    /// there is no incremental merge across runs.
    pub fn reset(&mut self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                r#"
                DROP TABLE IF EXISTS private_index;
                DROP TABLE IF EXISTS {PUBLIC_DB_ALIAS}.public_index;
                DROP TABLE IF EXISTS {PUBLIC_DB_ALIAS}.run_meta;
                {PRIVATE_SCHEMA}
                {PUBLIC_SCHEMA}
                "#
            ))
            .context("reset index schemas")?;
        Ok(())
    }

    /// Write every record's full detail to the private projection and its
    /// anonymized derivation to the public projection, then the run completion
    /// marker, all in one transaction. A primary-key collision aborts and rolls
    /// back the whole batch with the offending record identified.
    pub fn insert_batch(&mut self, records: &[FileRecord]) -> Result<usize> {
        let tx = self.conn.transaction().context("begin batch transaction")?;
        {
            let mut private_stmt = tx
                .prepare(
                    "INSERT INTO private_index (
                        root_path, relative_path, file_name, file_extension, mime_type,
                        file_size, created_time, modified_time,
                        content_hash, root_path_hash, relative_path_hash,
                        filename_hash, absolute_path_hash
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                )
                .context("prepare private insert")?;
            let mut public_stmt = tx
                .prepare(&format!(
                    "INSERT INTO {PUBLIC_DB_ALIAS}.public_index (
                        content_hash, root_path_hash, relative_path_hash,
                        filename_hash, absolute_path_hash,
                        file_size, created_time, modified_time
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ))
                .context("prepare public insert")?;

            for (n, record) in records.iter().enumerate() {
                let result = private_stmt.execute(params![
                    record.root_path,
                    record.relative_path,
                    record.file_name,
                    record.file_extension,
                    record.mime_type,
                    record.file_size as i64,
                    record.created_time,
                    record.modified_time,
                    &record.content_hash[..],
                    &record.root_path_hash[..],
                    &record.relative_path_hash[..],
                    &record.filename_hash[..],
                    &record.absolute_path_hash[..],
                ]);
                map_duplicate(result, record).context("insert private row")?;

                let result = public_stmt.execute(params![
                    &record.content_hash[..],
                    &record.root_path_hash[..],
                    &record.relative_path_hash[..],
                    &record.filename_hash[..],
                    &record.absolute_path_hash[..],
                    record.file_size as i64,
                    record.created_time,
                    record.modified_time,
                ]);
                map_duplicate(result, record).context("insert public row")?;

                if (n + 1).is_multiple_of(DB_INSERT_BATCH_SIZE) {
                    log::debug!("{} rows staged", n + 1);
                }
            }
        }

        let total: i64 = tx
            .query_row(
                &format!("SELECT COUNT(*) FROM {PUBLIC_DB_ALIAS}.public_index"),
                [],
                |row| row.get(0),
            )
            .context("count public rows")?;
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO {PUBLIC_DB_ALIAS}.run_meta \
                 (id, completed_at, record_count) VALUES (1, ?1, ?2)"
            ),
            params![format_timestamp(std::time::SystemTime::now()), total],
        )
        .context("write run marker")?;

        tx.commit().context("commit batch transaction")?;
        Ok(records.len())
    }

    /// Rows currently in the public projection.
    pub fn indexed_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {PUBLIC_DB_ALIAS}.public_index"),
                [],
                |row| row.get(0),
            )
            .context("count public rows")?;
        Ok(n as usize)
    }
}

/// Map a SQLite primary-key violation to [`StoreError::DuplicateKey`] carrying
/// the offending record's identity; pass everything else through, including
/// other constraint classes (NOT NULL, CHECK).
fn map_duplicate(result: rusqlite::Result<usize>, record: &FileRecord) -> Result<usize> {
    match result {
        Ok(n) => Ok(n),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Err(StoreError::DuplicateKey {
                root: record.root_path.clone(),
                relative_dir: record.relative_path.clone(),
                file_name: record.file_name.clone(),
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}
