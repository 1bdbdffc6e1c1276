//! `SQLite` record backend.
//!
//! Holds the encoded snapshot in a one-table key/value database. All
//! `rusqlite` calls run on the blocking thread pool so awaiting a storage
//! operation never stalls the caller's executor.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{migrations, RecordBackend, RecordStats};
use crate::error::{Error, Result};

const IN_MEMORY: &str = ":memory:";

/// Record backend stored in a local `SQLite` database file.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    /// Path to the database file, or `:memory:`.
    path: PathBuf,
    /// Lazily opened connection, shared with blocking tasks.
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteBackend {
    /// Create a backend for the database at `path`. Nothing is opened yet.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a backend over a private in-memory database.
    ///
    /// The data lives until [`close`](RecordBackend::close) is called.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.conn);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = slot
                .lock()
                .map_err(|_| Error::internal("record store connection lock poisoned"))?;
            if guard.is_none() {
                *guard = Some(open_connection(&path)?);
            }
            let Some(conn) = guard.as_mut() else {
                return Err(Error::internal("record store connection missing after open"));
            };
            op(conn)
        })
        .await?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    if path.as_os_str() == IN_MEMORY {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: path.to_path_buf(),
            source,
        })?;
        migrations::initialize_schema(&conn)?;
        return Ok(conn);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::unsupported(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
    }

    debug!("Opening record store at {}", path.display());
    let conn = Connection::open(path).map_err(|source| Error::DatabaseOpen {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    migrations::initialize_schema(&conn)?;

    info!("Record store opened at {}", path.display());
    Ok(conn)
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    async fn open(&self) -> Result<()> {
        self.with_connection(|_| Ok(())).await
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR REPLACE INTO app_data (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM app_data WHERE key = ?1",
                    [key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_connection(|conn| {
            let removed = conn.execute("DELETE FROM app_data", [])?;
            debug!("Cleared {} records", removed);
            Ok(())
        })
        .await
    }

    async fn stat(&self, key: &str) -> Result<Option<RecordStats>> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            let stats = conn
                .query_row(
                    "SELECT length(CAST(value AS BLOB)), updated_at FROM app_data WHERE key = ?1",
                    [key],
                    |row| {
                        let bytes: i64 = row.get(0)?;
                        Ok(RecordStats {
                            bytes: usize::try_from(bytes).unwrap_or(0),
                            updated_at: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(stats)
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        let slot = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = slot
                .lock()
                .map_err(|_| Error::internal("record store connection lock poisoned"))?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| Error::DatabaseQuery(e))?;
                debug!("Record store closed");
            }
            Ok(())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let backend = SqliteBackend::in_memory();
        assert!(backend.open().await.is_ok());
        assert!(backend.open().await.is_ok());
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let backend = SqliteBackend::in_memory();
        backend.put("backup_v1", "blob".to_string()).await.unwrap();
        assert_eq!(
            backend.get("backup_v1").await.unwrap().as_deref(),
            Some("blob")
        );
    }

    #[tokio::test]
    async fn test_get_missing() {
        let backend = SqliteBackend::in_memory();
        assert!(backend.get("backup_v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let backend = SqliteBackend::in_memory();
        backend.put("backup_v1", "first".to_string()).await.unwrap();
        backend.put("backup_v1", "second".to_string()).await.unwrap();
        assert_eq!(
            backend.get("backup_v1").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_clear_removes_records() {
        let backend = SqliteBackend::in_memory();
        backend.put("backup_v1", "blob".to_string()).await.unwrap();
        backend.put("other", "blob".to_string()).await.unwrap();

        backend.clear().await.unwrap();
        assert!(backend.get("backup_v1").await.unwrap().is_none());
        assert!(backend.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stat() {
        let backend = SqliteBackend::in_memory();
        assert!(backend.stat("backup_v1").await.unwrap().is_none());

        backend.put("backup_v1", "şöyle".to_string()).await.unwrap();
        let stats = backend.stat("backup_v1").await.unwrap().unwrap();
        assert_eq!(stats.bytes, "şöyle".len());
        assert!(stats.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_file_backed_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("babysteps.db");

        let backend = SqliteBackend::new(&path);
        backend.put("backup_v1", "persisted".to_string()).await.unwrap();
        backend.close().await.unwrap();

        let reopened = SqliteBackend::new(&path);
        assert_eq!(
            reopened.get("backup_v1").await.unwrap().as_deref(),
            Some("persisted")
        );
        assert_eq!(reopened.path(), path);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/babysteps.db");

        let backend = SqliteBackend::new(&path);
        backend.open().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unusable_location_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let backend = SqliteBackend::new(blocker.join("sub/babysteps.db"));
        let err = backend.open().await.unwrap_err();
        assert!(err.is_environment_unsupported());
    }

    #[tokio::test]
    async fn test_close_then_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SqliteBackend::new(dir.path().join("babysteps.db"));
        backend.put("backup_v1", "blob".to_string()).await.unwrap();

        backend.close().await.unwrap();
        backend.close().await.unwrap();
        assert_eq!(
            backend.get("backup_v1").await.unwrap().as_deref(),
            Some("blob")
        );
    }

    #[tokio::test]
    async fn test_large_value() {
        let backend = SqliteBackend::in_memory();
        let large = "A".repeat(2_000_000);
        backend.put("backup_v1", large.clone()).await.unwrap();
        assert_eq!(backend.get("backup_v1").await.unwrap().unwrap().len(), large.len());
    }
}
