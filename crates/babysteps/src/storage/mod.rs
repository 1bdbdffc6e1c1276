//! Persistence backends.
//!
//! Two independent key spaces:
//!
//! - a [`RecordBackend`], asynchronous and versioned, holding the single
//!   encoded snapshot record;
//! - a [`FlagStore`], synchronous and tiny, holding the credential and the
//!   launch flag so the lock screen can be decided before the record backend
//!   has even opened.

pub mod flags;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;

pub use flags::{FileFlagStore, FlagStore, MemoryFlagStore};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Key of the snapshot record in the main store.
pub const DATA_KEY: &str = "backup_v1";

/// Key of the credential in the flag store.
pub const PIN_KEY: &str = "babysteps_pin";

/// Key of the launch flag in the flag store.
pub const LAUNCH_KEY: &str = "babysteps_has_launched";

/// Value written under [`LAUNCH_KEY`] once onboarding is done.
pub const LAUNCH_MARKER: &str = "true";

/// Summary of one stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStats {
    /// Length of the stored (encoded) value in bytes.
    pub bytes: usize,
    /// When the record was last written, if the backend tracks it.
    pub updated_at: Option<String>,
}

/// An asynchronous named record store.
///
/// `put` replaces a record atomically; readers never observe a partial value.
/// `put`, `get` and `clear` open the store on demand.
#[async_trait]
pub trait RecordBackend: Send + Sync + std::fmt::Debug {
    /// Open the store, creating its schema on first use. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EnvironmentUnsupported`](crate::Error::EnvironmentUnsupported)
    /// if this platform cannot persist data, or a backend error if opening fails.
    async fn open(&self) -> Result<()>;

    /// Overwrite the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the previous value is kept.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Read the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the records could not be removed.
    async fn clear(&self) -> Result<()>;

    /// Size and modification time of the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn stat(&self, key: &str) -> Result<Option<RecordStats>> {
        Ok(self.get(key).await?.map(|value| RecordStats {
            bytes: value.len(),
            updated_at: None,
        }))
    }

    /// Release the underlying resources. A later operation reopens the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be closed cleanly.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
