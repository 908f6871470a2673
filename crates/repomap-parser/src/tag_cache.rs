//! Persistent per-file tag cache, backed by an embedded SQLite store.
//! The only correct invalidation key is `(content hash, mtime)` jointly
//! — mtime alone misses content reverted to an old value with a bumped
//! mtime; hash alone forces a full re-read of every file on every run.

use repomap_core::error::{Error, Result};
use repomap_core::types::{CodeTag, FileTags, TagKind};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub cached_files: u64,
    pub total_tags: u64,
    pub approx_bytes: u64,
    pub location: PathBuf,
}

pub struct TagCache {
    conn: Mutex<Connection>,
    location: PathBuf,
}

impl TagCache {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        let conn = Connection::open(path).map_err(|e| Error::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
            location: path.to_path_buf(),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
            location: PathBuf::from(":memory:"),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS file_cache (
                file_path TEXT PRIMARY KEY,
                file_hash TEXT NOT NULL,
                mtime INTEGER NOT NULL,
                cached_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL REFERENCES file_cache(file_path) ON DELETE CASCADE,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                file TEXT NOT NULL,
                line INTEGER NOT NULL,
                column INTEGER NOT NULL,
                end_line INTEGER,
                end_column INTEGER,
                rel_fname TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_tags_file_path ON tags(file_path);
            CREATE INDEX IF NOT EXISTS idx_tags_kind ON tags(kind);
            ",
        )
        .map_err(|e| Error::Cache(e.to_string()))?;
        Ok(())
    }

    /// `Some(tags)` only when the file still exists, its current mtime
    /// is `<=` the stored mtime, *and* its current SHA-256 matches the
    /// stored hash; otherwise `None`. An empty tag list is a distinct,
    /// valid hit.
    pub fn get(&self, file_path: &Path) -> Result<Option<Vec<CodeTag>>> {
        let metadata = match std::fs::metadata(file_path) {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };
        let current_mtime = mtime_seconds(&metadata);

        let key = path_key(file_path);
        let conn = self.conn.lock();
        let stored: Option<(String, i64)> = conn
            .query_row(
                "SELECT file_hash, mtime FROM file_cache WHERE file_path = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .ok();

        let (stored_hash, stored_mtime) = match stored {
            Some(v) => v,
            None => return Ok(None),
        };

        if current_mtime > stored_mtime {
            return Ok(None);
        }

        let current_hash = match hash_file(file_path) {
            Ok(h) => h,
            Err(_) => return Ok(None),
        };
        if current_hash != stored_hash {
            return Ok(None);
        }

        let mut stmt = conn
            .prepare(
                "SELECT name, kind, file, line, column, end_line, end_column
                 FROM tags WHERE file_path = ?1",
            )
            .map_err(|e| Error::Cache(e.to_string()))?;
        let rows = stmt
            .query_map(params![key], |row| {
                let name: String = row.get(0)?;
                let kind: String = row.get(1)?;
                let file: String = row.get(2)?;
                let line: i64 = row.get(3)?;
                let column: i64 = row.get(4)?;
                let end_line: Option<i64> = row.get(5)?;
                let end_column: Option<i64> = row.get(6)?;
                Ok(CodeTag {
                    name,
                    kind: TagKind::parse(&kind),
                    file: PathBuf::from(file),
                    line: line as u32,
                    column: column as u32,
                    end_line: end_line.map(|v| v as u32),
                    end_column: end_column.map(|v| v as u32),
                    comment: None,
                })
            })
            .map_err(|e| Error::Cache(e.to_string()))?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row.map_err(|e| Error::Cache(e.to_string()))?);
        }
        debug!(file = %key, tags = tags.len(), "tag cache hit");
        Ok(Some(tags))
    }

    /// Atomically replace the cache row and tag rows for one file.
    pub fn put(&self, file_path: &Path, tags: &[CodeTag]) -> Result<()> {
        let metadata = std::fs::metadata(file_path).map_err(Error::Io)?;
        let mtime = mtime_seconds(&metadata);
        let hash = hash_file(file_path)?;
        let key = path_key(file_path);
        let now = std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Cache(e.to_string()))?;
        tx.execute("DELETE FROM file_cache WHERE file_path = ?1", params![key])
            .map_err(|e| Error::Cache(e.to_string()))?;
        tx.execute(
            "INSERT INTO file_cache (file_path, file_hash, mtime, cached_at) VALUES (?1, ?2, ?3, ?4)",
            params![key, hash, mtime, now],
        )
        .map_err(|e| Error::Cache(e.to_string()))?;

        for tag in tags {
            tx.execute(
                "INSERT INTO tags (file_path, name, kind, file, line, column, end_line, end_column, rel_fname)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    key,
                    tag.name,
                    tag.kind.as_str(),
                    tag.file.to_string_lossy().to_string(),
                    tag.line,
                    tag.column,
                    tag.end_line,
                    tag.end_column,
                    tag.file.file_name().map(|n| n.to_string_lossy().to_string()),
                ],
            )
            .map_err(|e| Error::Cache(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Cache(e.to_string()))?;
        Ok(())
    }

    pub fn invalidate(&self, file_path: &Path) -> Result<()> {
        let key = path_key(file_path);
        let conn = self.conn.lock();
        conn.execute("DELETE FROM file_cache WHERE file_path = ?1", params![key])
            .map_err(|e| Error::Cache(e.to_string()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch("DELETE FROM tags; DELETE FROM file_cache;")
            .map_err(|e| Error::Cache(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.conn.lock();
        let cached_files: u64 = conn
            .query_row("SELECT COUNT(*) FROM file_cache", [], |r| r.get(0))
            .unwrap_or(0);
        let total_tags: u64 = conn
            .query_row("SELECT COUNT(*) FROM tags", [], |r| r.get(0))
            .unwrap_or(0);
        let approx_bytes = std::fs::metadata(&self.location).map(|m| m.len()).unwrap_or(0);
        Ok(CacheStats {
            cached_files,
            total_tags,
            approx_bytes,
            location: self.location.clone(),
        })
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn mtime_seconds(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn hash_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(Error::Io)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// `Some(FileTags)` assembled with its own hash/mtime, for callers that
/// want the whole cache record rather than bare tags.
pub fn load_file_tags(cache: &TagCache, file_path: &Path) -> Result<Option<FileTags>> {
    let tags = match cache.get(file_path)? {
        Some(t) => t,
        None => return Ok(None),
    };
    let metadata = match std::fs::metadata(file_path) {
        Ok(m) => m,
        Err(e) => {
            warn!(file = %file_path.display(), error = %e, "file vanished after cache hit");
            return Ok(None);
        }
    };
    Ok(Some(FileTags {
        file: file_path.to_path_buf(),
        tags,
        content_hash: hash_file(file_path)?,
        mtime: mtime_seconds(&metadata),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tag(name: &str, line: u32) -> CodeTag {
        CodeTag::new(name, TagKind::Definition, PathBuf::from("foo.py"), line, 0)
    }

    #[test]
    fn round_trip_hit_on_unchanged_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo.py");
        std::fs::write(&file, "def f(): pass\n").unwrap();

        let cache = TagCache::in_memory().unwrap();
        assert!(cache.get(&file).unwrap().is_none());

        cache.put(&file, &[tag("f", 1)]).unwrap();
        let hit = cache.get(&file).unwrap().expect("expected cache hit");
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "f");
    }

    #[test]
    fn miss_after_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo.py");
        std::fs::write(&file, "def f(): pass\n").unwrap();

        let cache = TagCache::in_memory().unwrap();
        cache.put(&file, &[tag("f", 1)]).unwrap();
        assert!(cache.get(&file).unwrap().is_some());

        let mut f = std::fs::OpenOptions::new().write(true).open(&file).unwrap();
        writeln!(f, "def g(): pass").unwrap();
        drop(f);
        // Bump mtime forward to guarantee the cache observes the change even on
        // filesystems with coarse mtime resolution.
        let far_future = std::time::SystemTime::now() + std::time::Duration::from_secs(10);
        f_set_mtime(&file, far_future);

        assert!(cache.get(&file).unwrap().is_none());
    }

    #[test]
    fn invalidate_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo.py");
        std::fs::write(&file, "def f(): pass\n").unwrap();

        let cache = TagCache::in_memory().unwrap();
        cache.put(&file, &[tag("f", 1)]).unwrap();
        cache.invalidate(&file).unwrap();
        assert!(cache.get(&file).unwrap().is_none());

        cache.put(&file, &[tag("f", 1)]).unwrap();
        cache.clear().unwrap();
        let stats = cache.stats().unwrap();
        assert_eq!(stats.cached_files, 0);
        assert_eq!(stats.total_tags, 0);
    }

    fn f_set_mtime(path: &Path, time: std::time::SystemTime) {
        let file = std::fs::File::open(path).unwrap();
        file.set_modified(time).unwrap();
    }
}
