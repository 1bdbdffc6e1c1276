//! In-process record backend.
//!
//! Nothing survives the process. Used for the `memory` backend kind, for
//! tests, and (via [`MemoryBackend::unsupported`]) to stand in for a platform
//! that has no persistent storage at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::RecordBackend;
use crate::error::{Error, Result};

/// Map-backed [`RecordBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, String>>,
    puts: AtomicUsize,
    unsupported: bool,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose every operation fails with
    /// [`Error::EnvironmentUnsupported`].
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Number of `put` calls that reached the map.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.unsupported {
            return Err(Error::unsupported("no persistent storage on this platform"));
        }
        self.records
            .lock()
            .map_err(|_| Error::internal("memory backend lock poisoned"))
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn open(&self) -> Result<()> {
        self.records().map(|_| ())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.records()?.insert(key.to_string(), value);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records()?.get(key).cloned())
    }

    async fn clear(&self) -> Result<()> {
        self.records()?.clear();
        Ok(())
    }
}
