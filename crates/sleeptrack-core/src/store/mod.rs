//! Session persistence.
//!
//! The tracker only talks to [`SessionStore`]. Calls are synchronous and may
//! block; callers on an async runtime run them on the blocking pool.
//!
//! - `sqlite`: file-backed store (one table, schema created on open)
//! - `memory`: mutex-guarded vector, for tests and throwaway runs

mod memory;
mod sqlite;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
use thiserror::Error;

use crate::session::{NewSession, SessionId, SleepSession};

/// A failed store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("sleep session {id} not found")]
    NotFound { id: SessionId },

    #[error("stored sleep quality {0} is out of range")]
    InvalidQuality(i64),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row-level persistence for sleep sessions.
///
/// Each call is atomic at row (or, for `clear`, table) granularity. The store
/// does not enforce "one open session"; that is the tracker's job.
pub trait SessionStore: Send + Sync {
    /// Adds a session and returns it with its assigned id.
    fn insert(&self, session: &NewSession) -> StoreResult<SleepSession>;

    /// Rewrites the row with `session.id`.
    fn update(&self, session: &SleepSession) -> StoreResult<()>;

    /// The session with the latest start time, if any.
    fn most_recent(&self) -> StoreResult<Option<SleepSession>>;

    /// Deletes every session.
    fn clear(&self) -> StoreResult<()>;

    fn get(&self, id: SessionId) -> StoreResult<Option<SleepSession>>;

    /// Every session, newest first.
    fn all(&self) -> StoreResult<Vec<SleepSession>>;
}

pub type SharedStore = Arc<dyn SessionStore>;

/// The open session a tracker should adopt on startup, if any.
///
/// Only the most recent session counts: an older open row is left alone.
pub fn open_session(store: &dyn SessionStore) -> StoreResult<Option<SleepSession>> {
    Ok(store.most_recent()?.filter(SleepSession::is_open))
}
