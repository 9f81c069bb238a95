//! SQLite cache store for large libraries.

use super::{CacheEntry, CacheStore, HashCache};
use crate::core::hasher::{Fingerprint, HashAlgorithmKind};
use crate::error::CacheError;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQLite-backed persistent store
///
/// Every save rewrites the `fingerprints` table inside one transaction.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn corrupted(&self, reason: impl ToString) -> CacheError {
        CacheError::Corrupted {
            path: self.db_path.clone(),
            reason: reason.to_string(),
        }
    }

    fn open_for_write(&self) -> Result<Connection, CacheError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                    path: self.db_path.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(&self.db_path).map_err(|e| CacheError::OpenFailed {
            path: self.db_path.clone(),
            reason: e.to_string(),
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             CREATE TABLE IF NOT EXISTS fingerprints (
                 path TEXT PRIMARY KEY,
                 algorithm TEXT NOT NULL,
                 bit_len INTEGER NOT NULL,
                 bits BLOB NOT NULL,
                 file_size INTEGER NOT NULL,
                 file_modified INTEGER NOT NULL
             );",
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(conn)
    }
}

/// One row as read from the table, before validation
struct RawRow {
    path: String,
    algorithm: String,
    bit_len: i64,
    bits: Vec<u8>,
    file_size: i64,
    file_modified: i64,
}

impl CacheStore for SqliteStore {
    fn load(&self) -> Result<Option<HashCache>, CacheError> {
        if !self.db_path.exists() {
            return Ok(None);
        }

        let conn = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| self.corrupted(e))?;

        let has_table: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'fingerprints'",
                [],
                |row| row.get::<_, i64>(0).map(|count| count > 0),
            )
            .map_err(|e| self.corrupted(e))?;

        if !has_table {
            return Ok(None);
        }

        let mut stmt = conn
            .prepare(
                "SELECT path, algorithm, bit_len, bits, file_size, file_modified FROM fingerprints",
            )
            .map_err(|e| self.corrupted(e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    path: row.get(0)?,
                    algorithm: row.get(1)?,
                    bit_len: row.get(2)?,
                    bits: row.get(3)?,
                    file_size: row.get(4)?,
                    file_modified: row.get(5)?,
                })
            })
            .map_err(|e| self.corrupted(e))?;

        let mut cache = HashCache::new();
        for row in rows {
            let row = row.map_err(|e| self.corrupted(e))?;

            let algorithm: HashAlgorithmKind =
                row.algorithm.parse().map_err(|e: String| self.corrupted(e))?;
            let bit_len = u32::try_from(row.bit_len)
                .map_err(|_| self.corrupted(format!("invalid bit length {}", row.bit_len)))?;
            let fingerprint =
                Fingerprint::new(row.bits, bit_len, algorithm).map_err(|e| self.corrupted(e))?;

            cache.insert(
                PathBuf::from(row.path),
                CacheEntry {
                    file_size: row.file_size as u64,
                    file_modified: row.file_modified as u64,
                    fingerprint,
                },
            );
        }

        Ok(Some(cache))
    }

    fn save(&self, cache: &HashCache) -> Result<(), CacheError> {
        let mut conn = self.open_for_write()?;
        let tx = conn
            .transaction()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        tx.execute("DELETE FROM fingerprints", [])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO fingerprints
                     (path, algorithm, bit_len, bits, file_size, file_modified)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

            for (path, entry) in cache.iter() {
                let Some(key) = path.to_str() else {
                    debug!(path = %path.display(), "not caching non-UTF-8 path");
                    continue;
                };
                stmt.execute(params![
                    key,
                    entry.fingerprint.algorithm().as_str(),
                    entry.fingerprint.bit_len() as i64,
                    entry.fingerprint.as_bytes(),
                    entry.file_size as i64,
                    entry.file_modified as i64,
                ])
                .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.db_path.display())
    }
}
