//! Application session controller.
//!
//! Drives the [`Store`] through one run of the application: decide the gate
//! synchronously at boot, load the snapshot in the background, keep the data
//! behind the lock screen, autosave edits, and reset on request.
//!
//! Autosave is armed only while the initial load has finished and the session
//! is [`SessionState::Unlocked`]. Every transition re-evaluates that: an armed
//! session (re)schedules a save of the current data, a disarmed one cancels
//! whatever was pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SessionConfig;
use crate::debounce::Debouncer;
use crate::defaults;
use crate::model::Snapshot;
use crate::store::Store;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet booted.
    Booting,
    /// First run; the onboarding flow is showing.
    Onboarding,
    /// A credential is required before the data is shown.
    Locked,
    /// Data may be shown and edited.
    Unlocked,
}

/// What the UI must render right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The initial load has not finished.
    Loading,
    /// The onboarding flow.
    Onboarding,
    /// Ask the user to choose a PIN.
    PinSetup,
    /// Ask the user for their PIN.
    PinEntry,
    /// The application proper.
    Open,
}

/// One run of the application over a [`Store`].
#[derive(Debug)]
pub struct Session {
    store: Arc<Store>,
    autosave: Debouncer,
    state: SessionState,
    has_pin: bool,
    loaded: bool,
    data: Snapshot,
    load: Option<JoinHandle<Option<Snapshot>>>,
}

impl Session {
    /// Create a session in [`SessionState::Booting`] holding the default data.
    #[must_use]
    pub fn new(store: Arc<Store>, config: &SessionConfig) -> Self {
        Self::with_delay(store, config.autosave_delay())
    }

    fn with_delay(store: Arc<Store>, delay: Duration) -> Self {
        Self {
            store,
            autosave: Debouncer::new(delay),
            state: SessionState::Booting,
            has_pin: false,
            loaded: false,
            data: defaults::initial_snapshot(),
            load: None,
        }
    }

    /// Decide the gate from the flags, then start loading the snapshot.
    ///
    /// The flag checks complete before this returns; the load runs as a
    /// background task collected by [`finish_loading`](Self::finish_loading).
    /// Calling this on a session that already booted does nothing.
    pub fn boot(&mut self) {
        if self.state != SessionState::Booting {
            return;
        }

        self.state = if self.store.is_first_launch() {
            SessionState::Onboarding
        } else {
            self.has_pin = self.store.has_credential();
            if self.has_pin {
                SessionState::Locked
            } else {
                SessionState::Unlocked
            }
        };
        info!("Session booted: {:?}", self.state);

        let store = Arc::clone(&self.store);
        self.load = Some(tokio::spawn(async move { store.load_snapshot().await }));
    }

    /// Wait for the background load, adopt its result, and arm autosave if
    /// the session is already unlocked.
    ///
    /// Keeps the default data when nothing usable was stored.
    pub async fn finish_loading(&mut self) {
        let Some(load) = self.load.take() else {
            return;
        };

        match load.await {
            Ok(Some(snapshot)) => self.data = snapshot,
            Ok(None) => debug!("No stored snapshot, keeping defaults"),
            Err(e) => error!("Snapshot load task failed: {e}"),
        }
        self.loaded = true;
        self.sync_autosave();
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the initial load has finished.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// What the UI must render.
    #[must_use]
    pub fn gate(&self) -> Gate {
        if !self.loaded {
            return Gate::Loading;
        }
        match self.state {
            SessionState::Booting => Gate::Loading,
            SessionState::Onboarding => Gate::Onboarding,
            SessionState::Locked | SessionState::Unlocked if !self.has_pin => Gate::PinSetup,
            SessionState::Locked => Gate::PinEntry,
            SessionState::Unlocked => Gate::Open,
        }
    }

    /// The data, only while the gate is [`Gate::Open`].
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        (self.gate() == Gate::Open).then_some(&self.data)
    }

    /// Apply an edit and schedule an autosave.
    ///
    /// Returns `false` without touching the data unless the load has finished
    /// and the session is unlocked.
    pub fn mutate(&mut self, edit: impl FnOnce(&mut Snapshot)) -> bool {
        if !self.autosave_armed() {
            return false;
        }
        edit(&mut self.data);
        self.sync_autosave();
        true
    }

    /// Finish onboarding: record the launch and unlock.
    ///
    /// This also forgets that a PIN exists, so the next gate is
    /// [`Gate::PinSetup`] even when a credential is stored, and the PIN chosen
    /// there overwrites it.
    pub fn complete_onboarding(&mut self) {
        if self.state != SessionState::Onboarding {
            return;
        }
        self.store.mark_launched();
        self.state = SessionState::Unlocked;
        self.has_pin = false;
        self.sync_autosave();
    }

    /// Handle a PIN typed at the lock screen.
    ///
    /// With no PIN set this stores `pin` as the new credential. Otherwise the
    /// session unlocks only if `pin` matches. Returns whether it unlocked.
    pub fn submit_pin(&mut self, pin: &str) -> bool {
        if !matches!(self.state, SessionState::Locked | SessionState::Unlocked) {
            return false;
        }

        if !self.has_pin {
            self.store.set_credential(pin);
            self.has_pin = true;
        } else if !self.store.verify_credential(pin) {
            debug!("PIN rejected");
            return false;
        }

        self.state = SessionState::Unlocked;
        self.sync_autosave();
        true
    }

    /// Lock the session. A pending autosave is dropped and rescheduled on
    /// the next unlock.
    pub fn lock(&mut self) {
        if self.state == SessionState::Unlocked {
            self.state = SessionState::Locked;
            self.sync_autosave();
        }
    }

    /// Wipe everything and start over with a freshly booted, loaded session.
    ///
    /// A pending autosave is dropped. One that is already writing finishes
    /// before the wipe, so it cannot resurrect the old data.
    pub async fn reset(self) -> Session {
        let store = Arc::clone(&self.store);
        let delay = self.autosave.delay();
        self.autosave.stop().await;
        self.shutdown();

        store.wipe_all().await;

        let mut fresh = Self::with_delay(store, delay);
        fresh.boot();
        fresh.finish_loading().await;
        fresh
    }

    /// End the session, dropping any pending autosave.
    pub fn shutdown(self) {
        if self.autosave.cancel() {
            debug!("Dropped pending autosave on shutdown");
        }
        if let Some(load) = &self.load {
            load.abort();
        }
    }

    fn autosave_armed(&self) -> bool {
        self.loaded && self.state == SessionState::Unlocked
    }

    fn sync_autosave(&self) {
        if !self.autosave_armed() {
            if self.autosave.cancel() {
                debug!("Autosave cancelled");
            }
            return;
        }

        let store = Arc::clone(&self.store);
        let data = self.data.clone();
        self.autosave.schedule(async move {
            store.save_snapshot(&data).await;
        });
    }
}
