//! SQLite-based cache storage with file blob support
//!
//! Small values live inline in SQLite, large values (>10KB) as files.
//! Entries carry their own write time and TTL in milliseconds; expiry is
//! decided by the reader against its own clock.

use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 2;

/// Values larger than this are stored as external blobs
const INLINE_THRESHOLD: usize = 10 * 1024; // 10KB

type Result<T> = std::result::Result<T, CacheError>;

/// A raw entry as persisted, before any expiry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub data: Vec<u8>,
    pub stored_at_ms: i64,
    pub ttl_ms: i64,
}

impl StoredEntry {
    /// An entry is valid iff `now - stored_at < ttl`.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms - self.stored_at_ms < self.ttl_ms
    }
}

/// SQLite-backed cache storage with file blob support
pub struct CacheStorage {
    conn: Connection,
    blobs_dir: PathBuf,
}

impl CacheStorage {
    /// Open or create cache storage at the default XDG cache location
    pub fn open() -> Result<Self> {
        let cache_dir = Self::cache_dir()?;
        Self::open_at(&cache_dir)
    }

    /// Get the cache directory path (~/.cache/nutrilog on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("nutrilog"))
    }

    /// Open cache storage at a specific directory
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join("cache.db");
        let blobs_dir = cache_dir.join("blobs");
        std::fs::create_dir_all(&blobs_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create blobs dir: {}", e)))?;

        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            Self::nuke(&db_path, &blobs_dir)?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_key TEXT PRIMARY KEY NOT NULL,
                user_id TEXT,
                endpoint TEXT NOT NULL,
                data TEXT,
                blob_path TEXT,
                stored_at_ms INTEGER NOT NULL,
                ttl_ms INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_user_id ON cache_entries(user_id);
            CREATE INDEX IF NOT EXISTS idx_endpoint ON cache_entries(endpoint);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self { conn, blobs_dir })
    }

    /// Read an entry regardless of age.
    pub fn get_entry(&self, key: &str) -> Result<Option<StoredEntry>> {
        let row: Option<(Option<String>, Option<String>, i64, i64)> = self
            .conn
            .query_row(
                "SELECT data, blob_path, stored_at_ms, ttl_ms FROM cache_entries
                 WHERE cache_key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((data, blob_path, stored_at_ms, ttl_ms)) = row else {
            return Ok(None);
        };

        let data = match (data, blob_path) {
            (Some(data), None) => data.into_bytes(),
            (None, Some(blob_path)) => match std::fs::read(self.blobs_dir.join(&blob_path)) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("Failed to read blob {}: {}", blob_path, e);
                    self.delete_by_key(key)?;
                    return Ok(None);
                }
            },
            _ => return Ok(None),
        };

        Ok(Some(StoredEntry {
            data,
            stored_at_ms,
            ttl_ms,
        }))
    }

    /// Store data, overwriting any previous entry under the same key
    pub fn put(
        &self,
        key: &str,
        data: &[u8],
        endpoint: &str,
        user_id: Option<&str>,
        stored_at_ms: i64,
        ttl_ms: i64,
    ) -> Result<()> {
        if data.len() <= INLINE_THRESHOLD {
            self.conn.execute(
                "INSERT OR REPLACE INTO cache_entries
                 (cache_key, user_id, endpoint, data, blob_path, stored_at_ms, ttl_ms, size_bytes)
                 VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7)",
                params![
                    key,
                    user_id,
                    endpoint,
                    String::from_utf8_lossy(data).to_string(),
                    stored_at_ms,
                    ttl_ms,
                    data.len()
                ],
            )?;
        } else {
            let blob_path = self.write_blob(key, data)?;
            self.conn.execute(
                "INSERT OR REPLACE INTO cache_entries
                 (cache_key, user_id, endpoint, data, blob_path, stored_at_ms, ttl_ms, size_bytes)
                 VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7)",
                params![
                    key,
                    user_id,
                    endpoint,
                    blob_path,
                    stored_at_ms,
                    ttl_ms,
                    data.len()
                ],
            )?;
        }
        Ok(())
    }

    /// Clear all cache entries
    pub fn clear_all(&self) -> Result<ClearStats> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;

        self.conn.execute("DELETE FROM cache_entries", [])?;

        if self.blobs_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.blobs_dir) {
                log::warn!("Failed to clear blobs directory: {}", e);
            }
            std::fs::create_dir_all(&self.blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to recreate blobs dir: {}", e)))?;
        }

        Ok(ClearStats {
            entries_removed: count as usize,
        })
    }

    /// Delete a specific cache entry by key
    pub fn delete_by_key(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM cache_entries WHERE cache_key = ?1", [key])?;
        Ok(deleted > 0)
    }

    /// Delete cache entries by endpoint and optional user_id
    ///
    /// Used to invalidate cached reads after mutations, e.g.
    /// `delete_by_endpoint("list_meals", Some("user-1"))` drops every cached
    /// day of that user's meal list.
    pub fn delete_by_endpoint(&self, endpoint: &str, user_id: Option<&str>) -> Result<usize> {
        let deleted = match user_id {
            Some(user) => self.conn.execute(
                "DELETE FROM cache_entries WHERE endpoint = ?1 AND user_id = ?2",
                params![endpoint, user],
            )?,
            None => self.conn.execute(
                "DELETE FROM cache_entries WHERE endpoint = ?1",
                params![endpoint],
            )?,
        };
        Ok(deleted)
    }

    /// Drop every entry that is expired at `now_ms`
    pub fn purge_expired(&self, now_ms: i64) -> Result<usize> {
        let purged = self.conn.execute(
            "DELETE FROM cache_entries WHERE ?1 - stored_at_ms >= ttl_ms",
            [now_ms],
        )?;
        Ok(purged)
    }

    /// Get cache statistics as seen at `now_ms`
    pub fn stats(&self, now_ms: i64) -> Result<CacheStats> {
        let total_entries: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;

        let valid_entries: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE ?1 - stored_at_ms < ttl_ms",
            [now_ms],
            |r| r.get(0),
        )?;

        let total_size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM cache_entries",
            [],
            |r| r.get(0),
        )?;

        let oldest: Option<i64> = self
            .conn
            .query_row(
                "SELECT MIN(stored_at_ms) FROM cache_entries WHERE ?1 - stored_at_ms < ttl_ms",
                [now_ms],
                |r| r.get(0),
            )
            .optional()?
            .flatten();

        let newest: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(stored_at_ms) FROM cache_entries WHERE ?1 - stored_at_ms < ttl_ms",
                [now_ms],
                |r| r.get(0),
            )
            .optional()?
            .flatten();

        Ok(CacheStats {
            total_entries: total_entries as usize,
            valid_entries: valid_entries as usize,
            expired_entries: (total_entries - valid_entries) as usize,
            total_size_bytes: total_size as usize,
            oldest_entry_ms: oldest,
            newest_entry_ms: newest,
        })
    }

    /// Write a blob file, sharded by first 2 chars of key
    fn write_blob(&self, key: &str, data: &[u8]) -> Result<String> {
        let shard = &key[..2.min(key.len())];
        let shard_dir = self.blobs_dir.join(shard);
        std::fs::create_dir_all(&shard_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create shard dir: {}", e)))?;

        let filename = format!("{}.json", key);
        let rel_path = format!("{}/{}", shard, filename);

        std::fs::write(shard_dir.join(&filename), data)
            .map_err(|e| CacheError::Io(format!("Failed to write blob: {}", e)))?;

        Ok(rel_path)
    }

    /// Nuke the cache (delete DB and all blobs)
    fn nuke(db_path: &Path, blobs_dir: &Path) -> Result<()> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
        }
        if blobs_dir.exists() {
            std::fs::remove_dir_all(blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to remove blobs dir: {}", e)))?;
        }
        Ok(())
    }
}

/// Statistics about cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Statistics about cache state
#[derive(Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry_ms: Option<i64>,
    pub newest_entry_ms: Option<i64>,
}
