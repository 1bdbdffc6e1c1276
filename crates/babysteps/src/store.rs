//! The persistence façade.
//!
//! [`Store`] is what the rest of the application talks to. It owns the
//! failure policy: every error below this line is logged and absorbed, so
//! callers only ever see `Option`/`bool`/`()` results. The `try_*` variants
//! return the underlying [`Result`] for tools that want to report causes.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::codec::{self, Codec, XorCodec};
use crate::config::{BackendKind, Config};
use crate::error::{Error, Result};
use crate::model::Snapshot;
use crate::snapshot;
use crate::storage::{
    FileFlagStore, FlagStore, MemoryBackend, MemoryFlagStore, RecordBackend, RecordStats,
    SqliteBackend, DATA_KEY, LAUNCH_KEY, LAUNCH_MARKER, PIN_KEY,
};

/// Local persistent store for one user's data.
///
/// Construct once at startup and share by reference (or `Arc`) with the
/// session and the views; call [`close`](Self::close) on shutdown.
#[derive(Debug, Clone)]
pub struct Store {
    backend: Arc<dyn RecordBackend>,
    flags: Arc<dyn FlagStore>,
    codec: Arc<dyn Codec>,
}

impl Store {
    /// Create a store over the given backends using the default codec.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordBackend>, flags: Arc<dyn FlagStore>) -> Self {
        Self::with_codec(backend, flags, Arc::new(XorCodec::default()))
    }

    /// Create a store with an explicit codec.
    #[must_use]
    pub fn with_codec(
        backend: Arc<dyn RecordBackend>,
        flags: Arc<dyn FlagStore>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            backend,
            flags,
            codec,
        }
    }

    /// A store whose data lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(MemoryFlagStore::new()),
        )
    }

    /// Build the store described by the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        match config.storage.backend {
            BackendKind::Sqlite => Self::new(
                Arc::new(SqliteBackend::new(config.database_path())),
                Arc::new(FileFlagStore::new(config.flags_path())),
            ),
            BackendKind::Memory => Self::in_memory(),
        }
    }

    // === Launch flag ===

    /// Whether onboarding has never been completed. An unreadable or empty
    /// flag counts as first launch.
    #[must_use]
    pub fn is_first_launch(&self) -> bool {
        match self.flags.get(LAUNCH_KEY) {
            Ok(value) => value.filter(|v| !v.is_empty()).is_none(),
            Err(e) => {
                warn!("Failed to read launch flag: {e}");
                true
            }
        }
    }

    /// Record that onboarding is done.
    pub fn mark_launched(&self) {
        if let Err(e) = self.flags.set(LAUNCH_KEY, LAUNCH_MARKER) {
            error!("Failed to store launch flag: {e}");
        }
    }

    // === Credential ===

    /// Whether a PIN has been set.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.stored_credential().is_some()
    }

    /// Store a PIN, replacing any existing one.
    pub fn set_credential(&self, pin: &str) {
        if let Err(e) = self.try_set_credential(pin) {
            error!("Failed to store credential: {e}");
        }
    }

    /// [`set_credential`](Self::set_credential), reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag store could not be written.
    pub fn try_set_credential(&self, pin: &str) -> Result<()> {
        self.flags.set(PIN_KEY, &codec::obscure_credential(pin))
    }

    /// Check a candidate PIN. Always `false` when no PIN is stored.
    #[must_use]
    pub fn verify_credential(&self, candidate: &str) -> bool {
        self.stored_credential()
            .is_some_and(|stored| stored == codec::obscure_credential(candidate))
    }

    /// Remove the stored PIN.
    pub fn remove_credential(&self) {
        if let Err(e) = self.flags.remove(PIN_KEY) {
            error!("Failed to remove credential: {e}");
        }
    }

    fn stored_credential(&self) -> Option<String> {
        match self.flags.get(PIN_KEY) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Failed to read credential: {e}");
                None
            }
        }
    }

    // === Snapshot ===

    /// Load the persisted snapshot.
    ///
    /// Returns `None` when there is no record yet, when it can't be decoded or
    /// parsed, or when the backend fails. All of these mean "use defaults".
    pub async fn load_snapshot(&self) -> Option<Snapshot> {
        match self.try_load_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_codec_failure() => {
                warn!("Stored snapshot is unusable, starting fresh: {e}");
                None
            }
            Err(e) => {
                error!("Storage load failed: {e}");
                None
            }
        }
    }

    /// [`load_snapshot`](Self::load_snapshot), reporting failures.
    ///
    /// # Errors
    ///
    /// Returns the backend, decode or deserialize error that prevented loading.
    pub async fn try_load_snapshot(&self) -> Result<Option<Snapshot>> {
        self.backend.open().await?;
        let Some(encoded) = self.backend.get(DATA_KEY).await? else {
            debug!("No snapshot stored yet");
            return Ok(None);
        };
        if encoded.is_empty() {
            return Err(Error::decode("stored record is empty"));
        }

        let json = self.codec.decode(&encoded)?;
        let snapshot = snapshot::deserialize(&json)?;
        info!("Loaded snapshot ({} bytes stored)", encoded.len());
        Ok(Some(snapshot))
    }

    /// Persist a snapshot, replacing the previous one. Failures are logged.
    pub async fn save_snapshot(&self, snapshot: &Snapshot) {
        if let Err(e) = self.try_save_snapshot(snapshot).await {
            error!("Storage save failed: {e}");
        }
    }

    /// [`save_snapshot`](Self::save_snapshot), reporting failures.
    ///
    /// # Errors
    ///
    /// Returns the serialize, encode or backend error that prevented saving.
    pub async fn try_save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot::serialize(snapshot)?;
        let encoded = self.codec.encode(&json)?;
        let bytes = encoded.len();

        self.backend.open().await?;
        self.backend.put(DATA_KEY, encoded).await?;
        debug!("Saved snapshot ({bytes} bytes stored)");
        Ok(())
    }

    /// Size and write time of the stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn record_stats(&self) -> Result<Option<RecordStats>> {
        self.backend.open().await?;
        self.backend.stat(DATA_KEY).await
    }

    // === Lifecycle ===

    /// Remove the credential, the launch flag and every stored record.
    ///
    /// Each removal is attempted even if an earlier one failed.
    pub async fn wipe_all(&self) {
        if let Err(e) = self.flags.remove(PIN_KEY) {
            error!("Failed to remove credential during wipe: {e}");
        }
        if let Err(e) = self.flags.remove(LAUNCH_KEY) {
            error!("Failed to remove launch flag during wipe: {e}");
        }
        if let Err(e) = self.backend.clear().await {
            error!("Failed to clear record store during wipe: {e}");
        }
        info!("All local data wiped");
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Err(e) = self.backend.close().await {
            warn!("Failed to close record store: {e}");
        }
    }
}
