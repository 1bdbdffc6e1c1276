//! `babysteps` - Local encrypted persistence for a baby journal
//!
//! This library keeps one family's baby-tracking data on the device: an
//! obfuscated snapshot record in a local database, a PIN and first-launch
//! flag beside it, and a session controller that loads, gates and autosaves
//! that data for the application.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod advisor;
pub mod cli;
pub mod codec;
pub mod config;
pub mod debounce;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use advisor::{Advisor, ChatMessage, UnavailableAdvisor};
pub use codec::{Codec, XorCodec};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::Snapshot;
pub use session::{Gate, Session, SessionState};
pub use storage::{FlagStore, RecordBackend};
pub use store::Store;
