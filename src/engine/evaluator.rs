//! Relational consistency evaluation over the public index.
//!
//! Every stage is a table in the evaluation database, rebuilt from scratch per
//! run: distinct contents, distinct locations, their cross product (the
//! expected structure), and the anti-join against the actual index (the
//! missing set). A location is the (root_path_hash, relative_path_hash) pair,
//! so sibling replica roots count as distinct locations.

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::types::{ConsistencyReport, Digest, MissingRow};

/// Alias under which the public index is attached to the evaluation connection.
const INDEX_DB_ALIAS: &str = "idx";

/// Evaluation database with the public index attached. Every stage only reads
/// the index; the private projection is never opened.
pub struct Evaluator {
    conn: Connection,
}

impl Evaluator {
    /// Open the evaluation database (in-memory when `evaluation_db` is None)
    /// and attach the public index. The index must exist before anything is
    /// opened, so a rejected run leaves no evaluation file behind.
    pub fn open(public_db: &Path, evaluation_db: Option<&Path>) -> Result<Self> {
        if !public_db.is_file() {
            bail!(
                "public index {} does not exist; run indexing first",
                public_db.display()
            );
        }
        let conn = match evaluation_db {
            Some(path) => Connection::open(path).context("open evaluation database")?,
            None => Connection::open_in_memory().context("open in-memory evaluation database")?,
        };
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {INDEX_DB_ALIAS}"),
            params![public_db.to_string_lossy()],
        )
        .context("attach public index database")?;
        Ok(Self { conn })
    }

    /// Run all four stages and collect the report. Refuses to evaluate an
    /// index without a committed run marker, or whose marker disagrees with
    /// the row count (a partially written store has undefined meaning).
    pub fn evaluate(&mut self) -> Result<ConsistencyReport> {
        let total_indexed = self.guard_populated()?;

        self.reset_stages()?;
        self.build_unique_contents()?;
        self.build_unique_locations()?;
        self.build_expected_structure()?;
        self.build_missing_set()?;

        let unique_contents = self.count_rows("unique_contents")?;
        let unique_locations = self.count_rows("unique_locations")?;
        let missing = self.read_missing()?;

        Ok(ConsistencyReport {
            unique_contents,
            unique_locations,
            total_indexed,
            missing,
        })
    }

    /// Verify the index was populated by a completed, committed batch.
    /// Returns the indexed row count.
    fn guard_populated(&self) -> Result<usize> {
        let has_marker: i64 = self
            .conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {INDEX_DB_ALIAS}.sqlite_master \
                     WHERE type = 'table' AND name = 'run_meta'"
                ),
                [],
                |row| row.get(0),
            )
            .context("inspect index schema")?;
        if has_marker == 0 {
            bail!("public index has never been populated; run indexing first");
        }
        let marker: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT record_count FROM {INDEX_DB_ALIAS}.run_meta WHERE id = 1"),
                [],
                |row| row.get(0),
            )
            .optional()
            .context("read run marker")?;
        let Some(expected) = marker else {
            bail!("public index has no completed run; run indexing first");
        };
        let actual: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {INDEX_DB_ALIAS}.public_index"),
                [],
                |row| row.get(0),
            )
            .context("count indexed rows")?;
        if actual != expected {
            bail!(
                "public index is stale or partially written: run marker says {} rows, found {}",
                expected,
                actual
            );
        }
        Ok(actual as usize)
    }

    /// Drop and recreate every stage table (no incremental update).
    fn reset_stages(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                DROP TABLE IF EXISTS unique_contents;
                DROP TABLE IF EXISTS unique_locations;
                DROP TABLE IF EXISTS expected_structure;
                DROP TABLE IF EXISTS missing_files;

                CREATE TABLE unique_contents (
                    content_hash BLOB NOT NULL PRIMARY KEY,
                    occurrences  INTEGER NOT NULL
                );
                CREATE TABLE unique_locations (
                    root_path_hash     BLOB NOT NULL,
                    relative_path_hash BLOB NOT NULL,
                    occurrences        INTEGER NOT NULL,
                    PRIMARY KEY (root_path_hash, relative_path_hash)
                );
                CREATE TABLE expected_structure (
                    root_path_hash     BLOB NOT NULL,
                    relative_path_hash BLOB NOT NULL,
                    content_hash       BLOB NOT NULL
                );
                CREATE TABLE missing_files (
                    root_path_hash     BLOB NOT NULL,
                    relative_path_hash BLOB NOT NULL,
                    content_hash       BLOB NOT NULL
                );
                "#,
            )
            .context("reset evaluation stages")?;
        Ok(())
    }

    /// Stage 1: distinct content fingerprints with occurrence counts.
    fn build_unique_contents(&self) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO unique_contents (content_hash, occurrences)
                     SELECT content_hash, COUNT(*)
                     FROM {INDEX_DB_ALIAS}.public_index
                     GROUP BY content_hash"
                ),
                [],
            )
            .context("build unique content set")?;
        Ok(())
    }

    /// Stage 2: distinct location pairs with occurrence counts.
    fn build_unique_locations(&self) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO unique_locations (root_path_hash, relative_path_hash, occurrences)
                     SELECT root_path_hash, relative_path_hash, COUNT(*)
                     FROM {INDEX_DB_ALIAS}.public_index
                     GROUP BY root_path_hash, relative_path_hash"
                ),
                [],
            )
            .context("build unique location set")?;
        Ok(())
    }

    /// Stage 3: the replica hypothesis — every known content at every known
    /// location. Only meaningful when the configured roots are content-parallel
    /// replicas; that assumption is a design choice, not a derived fact.
    fn build_expected_structure(&self) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO expected_structure (root_path_hash, relative_path_hash, content_hash)
                 SELECT loc.root_path_hash, loc.relative_path_hash, con.content_hash
                 FROM unique_locations AS loc
                 CROSS JOIN unique_contents AS con",
                [],
            )
            .context("build expected structure")?;
        Ok(())
    }

    /// Stage 4: anti-join of the hypothesis against reality.
    fn build_missing_set(&self) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO missing_files (root_path_hash, relative_path_hash, content_hash)
                     SELECT e.root_path_hash, e.relative_path_hash, e.content_hash
                     FROM expected_structure AS e
                     WHERE NOT EXISTS (
                         SELECT 1 FROM {INDEX_DB_ALIAS}.public_index AS p
                         WHERE p.root_path_hash = e.root_path_hash
                           AND p.relative_path_hash = e.relative_path_hash
                           AND p.content_hash = e.content_hash
                     )"
                ),
                [],
            )
            .context("build missing set")?;
        Ok(())
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("count rows in {table}"))?;
        Ok(n as usize)
    }

    fn read_missing(&self) -> Result<Vec<MissingRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT root_path_hash, relative_path_hash, content_hash \
                 FROM missing_files ORDER BY root_path_hash, relative_path_hash, content_hash",
            )
            .context("prepare missing set read")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Vec<u8>>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })?;
        let mut missing = Vec::new();
        for row in rows {
            let (root, rel, content) = row?;
            missing.push(MissingRow {
                root_path_hash: to_digest(&root)?,
                relative_path_hash: to_digest(&rel)?,
                content_hash: to_digest(&content)?,
            });
        }
        Ok(missing)
    }
}

fn to_digest(bytes: &[u8]) -> Result<Digest> {
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("fingerprint column has {} bytes, expected 32", bytes.len()))
}
