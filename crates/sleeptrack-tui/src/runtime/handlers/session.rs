use sleeptrack_core::session::now_millis;
use sleeptrack_core::store::{self, StoreResult};
use sleeptrack_core::{
    NewSession, SessionId, SessionStore, SharedStore, SleepQuality, SleepSession, StoreError,
};

use crate::events::{QualityUiEvent, TrackerOp, TrackerUiEvent, UiEvent};

/// Runs a store call on the blocking pool.
///
/// A panicked call is reported like any other store failure.
async fn blocking<T, F>(store: SharedStore, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&dyn SessionStore) -> StoreResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("store task failed: {e}")),
    }
}

fn failed(op: TrackerOp, error: String) -> UiEvent {
    UiEvent::Tracker(TrackerUiEvent::Failed { op, error })
}

/// Startup restore: the most recent session, if it is still open.
pub async fn load_open_session(store: SharedStore) -> UiEvent {
    match blocking(store, store::open_session).await {
        Ok(session) => UiEvent::Tracker(TrackerUiEvent::OpenSessionLoaded { session }),
        Err(error) => failed(TrackerOp::Restore, error),
    }
}

/// Inserts an open session stamped now, then re-reads the latest one.
pub async fn start_session(store: SharedStore) -> UiEvent {
    let result = blocking(store, |store| {
        store.insert(&NewSession::open_at(now_millis()))?;
        store::open_session(store)
    })
    .await;
    match result {
        Ok(session) => UiEvent::Tracker(TrackerUiEvent::Started { session }),
        Err(error) => failed(TrackerOp::Start, error),
    }
}

/// Closes `session` now and persists it.
///
/// A row deleted behind our back yields `StopMissing` instead of a failure.
pub async fn stop_session(store: SharedStore, session: SleepSession) -> UiEvent {
    let id = session.id;
    let result = blocking(store, move |store| {
        let closed = session.closed_at(now_millis());
        match store.update(&closed) {
            Ok(()) => Ok(Some(closed)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await;
    match result {
        Ok(Some(session)) => UiEvent::Tracker(TrackerUiEvent::Stopped { session }),
        Ok(None) => UiEvent::Tracker(TrackerUiEvent::StopMissing { id }),
        Err(error) => failed(TrackerOp::Stop, error),
    }
}

pub async fn clear_history(store: SharedStore) -> UiEvent {
    match blocking(store, |store| store.clear()).await {
        Ok(()) => UiEvent::Tracker(TrackerUiEvent::Cleared),
        Err(error) => failed(TrackerOp::Clear, error),
    }
}

pub async fn load_nights(store: SharedStore) -> UiEvent {
    match blocking(store, |store| store.all()).await {
        Ok(nights) => UiEvent::Tracker(TrackerUiEvent::NightsLoaded { nights }),
        Err(error) => failed(TrackerOp::LoadHistory, error),
    }
}

/// Loads session `id`, sets its quality and writes it back.
pub async fn save_quality(store: SharedStore, id: SessionId, quality: SleepQuality) -> UiEvent {
    let result = blocking(store, move |store| {
        let Some(session) = store.get(id)? else {
            return Ok(None);
        };
        let rated = session.with_quality(quality);
        store.update(&rated)?;
        Ok(Some(rated))
    })
    .await;
    match result {
        Ok(Some(session)) => UiEvent::Quality(QualityUiEvent::Saved { session }),
        Ok(None) => UiEvent::Quality(QualityUiEvent::Missing { id }),
        Err(error) => UiEvent::Quality(QualityUiEvent::SaveFailed { error }),
    }
}
