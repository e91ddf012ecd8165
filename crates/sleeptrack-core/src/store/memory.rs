use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{SessionStore, StoreError, StoreResult};
use crate::session::{NewSession, SessionId, SleepSession};

/// In-process store. Ids start at 1 and are never reused, even after `clear`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: SessionId,
    sessions: Vec<SleepSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `sessions` (ids are kept as given).
    pub fn with_sessions(sessions: Vec<SleepSession>) -> Self {
        let next_id = sessions.iter().map(|s| s.id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(Inner { next_id, sessions }),
        }
    }

    /// Number of stored sessions. Counts through a poisoned lock.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sessions
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_poisoned| StoreError::Poisoned)
    }
}

fn newest_first(a: &SleepSession, b: &SleepSession) -> std::cmp::Ordering {
    b.start_time_millis
        .cmp(&a.start_time_millis)
        .then(b.id.cmp(&a.id))
}

impl SessionStore for MemoryStore {
    fn insert(&self, session: &NewSession) -> StoreResult<SleepSession> {
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let stored = session.clone().into_session(inner.next_id);
        inner.sessions.push(stored.clone());
        Ok(stored)
    }

    fn update(&self, session: &SleepSession) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let slot = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or(StoreError::NotFound { id: session.id })?;
        *slot = session.clone();
        Ok(())
    }

    fn most_recent(&self) -> StoreResult<Option<SleepSession>> {
        let inner = self.lock()?;
        Ok(inner.sessions.iter().min_by(|a, b| newest_first(a, b)).cloned())
    }

    fn clear(&self) -> StoreResult<()> {
        self.lock()?.sessions.clear();
        Ok(())
    }

    fn get(&self, id: SessionId) -> StoreResult<Option<SleepSession>> {
        let inner = self.lock()?;
        Ok(inner.sessions.iter().find(|s| s.id == id).cloned())
    }

    fn all(&self) -> StoreResult<Vec<SleepSession>> {
        let mut sessions = self.lock()?.sessions.clone();
        sessions.sort_by(newest_first);
        Ok(sessions)
    }
}
