//! Core sleeptrack library (session model, persistence, config, formatting).

pub mod config;
pub mod format;
pub mod logging;
pub mod quality;
pub mod session;
pub mod store;

pub use quality::SleepQuality;
pub use session::{NewSession, SessionId, SessionStatus, SleepSession};
pub use store::{MemoryStore, SessionStore, SharedStore, SqliteStore, StoreError};
