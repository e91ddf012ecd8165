//! UI event types.
//!
//! All inputs (terminal keys, user actions, async store results) are converted
//! to `UiEvent` before being processed by the reducer.
//!
//! ## Task Lifecycle Events
//!
//! Store work uses a uniform lifecycle:
//! - The runtime emits `UiEvent::TaskStarted` as soon as a task is spawned
//! - The runtime emits `UiEvent::TaskCompleted` with the result event when done
//! - The reducer is the only place that mutates `TaskState`
//!
//! A completion whose id is no longer the active one for its kind is dropped,
//! so only the latest request of each kind can change state.

use crossterm::event::Event as CrosstermEvent;
use sleeptrack_core::{SessionId, SleepQuality, SleepSession};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

/// User intents, independent of how they were entered (key press or CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartTracking,
    StopTracking,
    /// Ask to clear history (prompts first when configured to).
    RequestClear,
    /// Clear history now.
    ClearHistory,
    CancelClear,
    AcknowledgeNavigation,
    /// Open the rating screen for an existing session.
    OpenRating { id: SessionId },
    SelectQuality(SleepQuality),
    RaiseQuality,
    LowerQuality,
    SaveQuality,
    SkipQuality,
    Quit,
}

/// Store operations the tracker performs, for failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOp {
    Restore,
    Start,
    Stop,
    Clear,
    LoadHistory,
}

impl TrackerOp {
    pub fn describe(self) -> &'static str {
        match self {
            TrackerOp::Restore => "restore the current session",
            TrackerOp::Start => "start tracking",
            TrackerOp::Stop => "stop tracking",
            TrackerOp::Clear => "clear history",
            TrackerOp::LoadHistory => "load history",
        }
    }
}

/// Results of tracker store operations.
#[derive(Debug)]
pub enum TrackerUiEvent {
    /// Startup read finished; `session` is the unfinished one, if any.
    OpenSessionLoaded { session: Option<SleepSession> },

    /// Insert + re-read finished.
    Started { session: Option<SleepSession> },

    /// The held session was closed and persisted.
    Stopped { session: SleepSession },

    /// The held session's row was gone when stopping it.
    StopMissing { id: SessionId },

    Cleared,

    NightsLoaded { nights: Vec<SleepSession> },

    Failed { op: TrackerOp, error: String },
}

/// Results of the rating screen's store operations.
#[derive(Debug)]
pub enum QualityUiEvent {
    Saved { session: SleepSession },
    /// The session vanished (e.g. history was cleared elsewhere).
    Missing { id: SessionId },
    SaveFailed { error: String },
}

/// Unified event enum.
#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick (notice expiry).
    Tick,

    /// Terminal input event (key, resize).
    Terminal(CrosstermEvent),

    Action(Action),

    Tracker(TrackerUiEvent),

    Quality(QualityUiEvent),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },

    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
}

impl From<Action> for UiEvent {
    fn from(action: Action) -> Self {
        UiEvent::Action(action)
    }
}
