//! Headless runtime scenarios against in-memory stores.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use sleeptrack_core::config::Config;
use sleeptrack_core::store::StoreResult;
use sleeptrack_core::{
    MemoryStore, NewSession, SessionId, SessionStore, SharedStore, SleepQuality, SleepSession,
    StoreError,
};
use sleeptrack_tui::tracker::CLEARED_MESSAGE;
use sleeptrack_tui::{Action, Screen, SessionRuntime};

async fn runtime_with<S: SessionStore + 'static>(store: &Arc<S>) -> SessionRuntime {
    let shared: SharedStore = Arc::<S>::clone(store);
    let mut runtime = SessionRuntime::new(Config::default(), shared);
    runtime.settle().await;
    runtime
}

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Poisoned)
        } else {
            Ok(())
        }
    }
}

impl SessionStore for FlakyStore {
    fn insert(&self, session: &NewSession) -> StoreResult<SleepSession> {
        self.check()?;
        self.inner.insert(session)
    }
    fn update(&self, session: &SleepSession) -> StoreResult<()> {
        self.check()?;
        self.inner.update(session)
    }
    fn most_recent(&self) -> StoreResult<Option<SleepSession>> {
        self.inner.most_recent()
    }
    fn clear(&self) -> StoreResult<()> {
        self.check()?;
        self.inner.clear()
    }
    fn get(&self, id: SessionId) -> StoreResult<Option<SleepSession>> {
        self.inner.get(id)
    }
    fn all(&self) -> StoreResult<Vec<SleepSession>> {
        self.inner.all()
    }
}

/// Memory store whose inserts and updates each wait for one release.
struct GatedStore {
    inner: MemoryStore,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl GatedStore {
    fn new() -> (Self, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let store = Self {
            inner: MemoryStore::new(),
            gate: Mutex::new(gate),
        };
        (store, release)
    }

    fn wait(&self) -> StoreResult<()> {
        let gate = self.gate.lock().map_err(|_poisoned| StoreError::Poisoned)?;
        let _ = gate.recv();
        Ok(())
    }
}

impl SessionStore for GatedStore {
    fn insert(&self, session: &NewSession) -> StoreResult<SleepSession> {
        self.wait()?;
        self.inner.insert(session)
    }
    fn update(&self, session: &SleepSession) -> StoreResult<()> {
        self.wait()?;
        self.inner.update(session)
    }
    fn most_recent(&self) -> StoreResult<Option<SleepSession>> {
        self.inner.most_recent()
    }
    fn clear(&self) -> StoreResult<()> {
        self.inner.clear()
    }
    fn get(&self, id: SessionId) -> StoreResult<Option<SleepSession>> {
        self.inner.get(id)
    }
    fn all(&self) -> StoreResult<Vec<SleepSession>> {
        self.inner.all()
    }
}

#[tokio::test]
async fn start_opens_a_session() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;
    assert!(runtime.state().tracker.initialized);
    assert!(runtime.state().tracker.start_enabled());

    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;

    let tracker = &runtime.state().tracker;
    let current = tracker.current.as_ref().expect("recording");
    assert_eq!(current.start_time_millis, current.end_time_millis);
    assert!(tracker.stop_enabled());
    assert!(!tracker.start_enabled());
    assert_eq!(tracker.nights.len(), 1);
    assert_eq!(memory.len(), 1);
}

#[tokio::test]
async fn second_start_while_recording_inserts_nothing() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;

    runtime.dispatch(Action::StartTracking);
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;

    assert_eq!(memory.len(), 1);
}

#[tokio::test]
async fn stop_persists_and_opens_rating() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    let held = runtime.state().tracker.current.clone().expect("recording");

    runtime.dispatch(Action::StopTracking);
    runtime.settle().await;

    let stored = memory.get(held.id).unwrap().expect("stored");
    assert!(stored.end_time_millis >= stored.start_time_millis);
    assert!(!stored.is_open());

    let state = runtime.state();
    assert!(state.tracker.current.is_none());
    assert!(state.tracker.pending_navigation.is_none());
    assert_eq!(state.quality().map(|q| q.session_id), Some(held.id));
    assert_eq!(state.tracker.nights, vec![stored]);
}

#[tokio::test]
async fn stop_without_session_changes_nothing() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;

    runtime.dispatch(Action::StopTracking);
    runtime.settle().await;

    let state = runtime.state();
    assert!(state.tracker.current.is_none());
    assert!(state.tracker.pending_navigation.is_none());
    assert_eq!(state.screen, Screen::Tracker);
    assert!(state.notice.is_none());
    assert!(memory.is_empty());
}

#[tokio::test]
async fn clear_erases_everything() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;

    runtime.dispatch(Action::ClearHistory);
    runtime.settle().await;

    let state = runtime.state();
    assert!(memory.is_empty());
    assert!(state.tracker.current.is_none());
    assert!(state.tracker.nights.is_empty());
    assert!(!state.tracker.clear_enabled());
    assert_eq!(
        state.notice.as_ref().map(|n| n.message.as_str()),
        Some(CLEARED_MESSAGE)
    );
}

#[tokio::test]
async fn request_clear_asks_first_by_default() {
    let memory = Arc::new(MemoryStore::new());
    memory.insert(&NewSession::open_at(1_000)).unwrap();
    let mut runtime = runtime_with(&memory).await;

    runtime.dispatch(Action::RequestClear);
    runtime.settle().await;
    assert!(runtime.state().tracker.confirming_clear);
    assert_eq!(memory.len(), 1);

    runtime.dispatch(Action::CancelClear);
    assert!(!runtime.state().tracker.confirming_clear);
}

#[tokio::test]
async fn restart_adopts_unfinished_session() {
    let memory = Arc::new(MemoryStore::new());
    let open = memory.insert(&NewSession::open_at(1_000)).unwrap();

    let runtime = runtime_with(&memory).await;

    assert_eq!(runtime.state().tracker.current, Some(open));
}

#[tokio::test]
async fn restart_ignores_finished_session() {
    let finished = NewSession::open_at(1_000).into_session(3).closed_at(5_000);
    let memory = Arc::new(MemoryStore::with_sessions(vec![finished]));

    let mut runtime = runtime_with(&memory).await;

    assert!(runtime.state().tracker.current.is_none());
    assert_eq!(runtime.state().tracker.nights.len(), 1);

    // New ids continue after the preloaded one.
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    assert_eq!(runtime.state().tracker.current.as_ref().map(|s| s.id), Some(4));
}

#[tokio::test]
async fn rating_persists_and_returns_to_tracker() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    runtime.dispatch(Action::StopTracking);
    runtime.settle().await;
    let id = runtime.state().quality().expect("rating screen").session_id;

    runtime.dispatch(Action::SelectQuality(SleepQuality::Excellent));
    runtime.dispatch(Action::SaveQuality);
    runtime.settle().await;

    assert_eq!(runtime.state().screen, Screen::Tracker);
    let stored = memory.get(id).unwrap().expect("stored");
    assert_eq!(stored.quality, Some(SleepQuality::Excellent));
    assert_eq!(runtime.state().tracker.nights[0].quality, Some(SleepQuality::Excellent));
}

#[tokio::test]
async fn failing_store_reports_and_keeps_current() {
    let flaky = Arc::new(FlakyStore::default());
    let mut runtime = runtime_with(&flaky).await;
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    let held = runtime.state().tracker.current.clone();
    assert!(held.is_some());

    flaky.fail_writes.store(true, Ordering::SeqCst);
    runtime.dispatch(Action::StopTracking);
    runtime.settle().await;

    let state = runtime.state();
    assert_eq!(state.tracker.current, held);
    assert_eq!(state.screen, Screen::Tracker);
    let notice = state.notice.as_ref().expect("notice");
    assert!(notice.is_error());
    assert!(notice.message.starts_with("Couldn't stop tracking"));
}

#[tokio::test]
async fn teardown_discards_inflight_results() {
    let (gated, release) = GatedStore::new();
    let gated = Arc::new(gated);
    let mut runtime = runtime_with(&gated).await;

    runtime.dispatch(Action::StartTracking);
    assert!(runtime.state().tasks.start_session.is_running());
    runtime.shutdown();

    release.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    runtime.settle().await;
    runtime.dispatch(Action::StartTracking);

    assert!(runtime.is_shut_down());
    assert!(runtime.state().tracker.current.is_none());
    assert!(runtime.state().tracker.nights.is_empty());
}

#[tokio::test]
async fn clear_waits_for_inflight_stop() {
    let (gated, release) = GatedStore::new();
    let gated = Arc::new(gated);
    let mut runtime = runtime_with(&gated).await;
    release.send(()).unwrap();
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    let held = runtime.state().tracker.current.clone().expect("recording");

    runtime.dispatch(Action::StopTracking);
    assert!(runtime.state().tasks.stop_session.is_running());
    runtime.dispatch(Action::ClearHistory);
    assert!(!runtime.state().tasks.clear_history.is_running());

    release.send(()).unwrap();
    runtime.settle().await;

    let state = runtime.state();
    assert_eq!(gated.inner.len(), 1);
    assert_eq!(state.quality().map(|q| q.session_id), Some(held.id));

    // Once the stop has landed the clear goes through and leaves the rating.
    runtime.dispatch(Action::ClearHistory);
    runtime.settle().await;
    assert!(gated.inner.is_empty());
    assert_eq!(runtime.state().screen, Screen::Tracker);
    assert!(runtime.state().tracker.nights.is_empty());
}

#[tokio::test]
async fn stop_after_outside_clear_goes_idle() {
    let memory = Arc::new(MemoryStore::new());
    let mut runtime = runtime_with(&memory).await;
    runtime.dispatch(Action::StartTracking);
    runtime.settle().await;
    let held = runtime.state().tracker.current.clone().expect("recording");

    memory.clear().unwrap();
    runtime.dispatch(Action::StopTracking);
    runtime.settle().await;

    let state = runtime.state();
    assert!(state.tracker.current.is_none());
    assert_eq!(state.screen, Screen::Tracker);
    let notice = state.notice.as_ref().expect("notice");
    assert_eq!(notice.message, format!("Night #{} no longer exists", held.id));
    assert!(state.tracker.start_enabled());
}
