//! Tracker feature reducer.
//!
//! The four tracker operations (start, stop, clear, acknowledge) plus the
//! startup restore. Each operation only decides: it returns effects for the
//! runtime to run against the store, and the matching result event comes back
//! through [`handle_tracker_event`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use super::state::TrackerState;
use crate::common::{Notice, TaskSeq, Tasks};
use crate::effects::UiEffect;
use crate::events::{Action, TrackerOp, TrackerUiEvent};
use crate::mutations::StateMutation;

pub const CLEARED_MESSAGE: &str = "All your sleep data has been erased forever";

/// Startup restore: read the latest session and the history list.
///
/// Runs once; later calls are ignored.
pub fn initialize(state: &TrackerState, tasks: &Tasks, seq: &mut TaskSeq) -> Vec<UiEffect> {
    if state.initialized || tasks.tracker_init.is_running() {
        return vec![];
    }
    vec![
        UiEffect::LoadOpenSession {
            task: seq.next_id(),
        },
        UiEffect::LoadNights {
            task: seq.next_id(),
        },
    ]
}

/// Opens a new session unless one is already held or being opened.
///
/// Also waits for the startup restore, which may still adopt an unfinished
/// session; starting before it lands could leave two open rows.
pub fn start_tracking(state: &TrackerState, tasks: &Tasks, seq: &mut TaskSeq) -> Vec<UiEffect> {
    if let Some(current) = &state.current {
        debug!(session_id = current.id, "Start ignored: already recording");
        return vec![];
    }
    if !state.initialized {
        debug!("Start ignored: restore still running");
        return vec![];
    }
    if tasks.start_session.is_running() {
        debug!("Start ignored: start already in flight");
        return vec![];
    }
    if tasks.clear_history.is_running() {
        debug!("Start ignored: clear in flight");
        return vec![];
    }
    vec![UiEffect::StartSession {
        task: seq.next_id(),
    }]
}

/// Closes the held session. No-op when nothing is being recorded.
pub fn stop_tracking(state: &TrackerState, tasks: &Tasks, seq: &mut TaskSeq) -> Vec<UiEffect> {
    let Some(current) = &state.current else {
        debug!("Stop ignored: not recording");
        return vec![];
    };
    if tasks.stop_session.is_running() {
        debug!(session_id = current.id, "Stop ignored: stop already in flight");
        return vec![];
    }
    if tasks.clear_history.is_running() {
        debug!(session_id = current.id, "Stop ignored: clear in flight");
        return vec![];
    }
    vec![UiEffect::StopSession {
        task: seq.next_id(),
        session: current.clone(),
    }]
}

/// Asks before clearing when `confirm` is set; otherwise clears at once.
pub fn request_clear(
    state: &mut TrackerState,
    confirm: bool,
    tasks: &Tasks,
    seq: &mut TaskSeq,
) -> Vec<UiEffect> {
    if !state.clear_enabled() && state.current.is_none() {
        debug!("Clear ignored: history already empty");
        return vec![];
    }
    if session_write_running(tasks) {
        debug!("Clear ignored: start or stop in flight");
        return vec![];
    }
    if confirm {
        state.confirming_clear = true;
        return vec![];
    }
    clear_history(state, tasks, seq)
}

/// Deletes every stored session. Refused while a start or stop is in flight.
pub fn clear_history(
    state: &mut TrackerState,
    tasks: &Tasks,
    seq: &mut TaskSeq,
) -> Vec<UiEffect> {
    state.confirming_clear = false;
    if session_write_running(tasks) {
        debug!("Clear ignored: start or stop in flight");
        return vec![];
    }
    vec![UiEffect::ClearHistory {
        task: seq.next_id(),
    }]
}

fn session_write_running(tasks: &Tasks) -> bool {
    tasks.start_session.is_running() || tasks.stop_session.is_running()
}

pub fn cancel_clear(state: &mut TrackerState) {
    state.confirming_clear = false;
}

/// Marks the pending navigation as handled.
pub fn acknowledge_navigation(state: &mut TrackerState) {
    state.pending_navigation = None;
}

/// Applies a store result to the tracker slice.
pub fn handle_tracker_event(state: &mut TrackerState, event: TrackerUiEvent) -> Vec<StateMutation> {
    match event {
        TrackerUiEvent::OpenSessionLoaded { session } => {
            if let Some(session) = &session {
                info!(session_id = session.id, "Resuming unfinished sleep session");
            }
            state.current = session;
            state.initialized = true;
            vec![]
        }
        TrackerUiEvent::Started { session } => {
            match &session {
                Some(session) => info!(session_id = session.id, "Sleep tracking started"),
                None => warn!("Inserted session did not read back as open"),
            }
            state.current = session;
            vec![StateMutation::RefreshNights]
        }
        TrackerUiEvent::Stopped { session } => {
            info!(
                session_id = session.id,
                duration_ms = session.duration_millis(),
                "Sleep tracking stopped"
            );
            state.current = None;
            state.pending_navigation = Some(session);
            vec![StateMutation::RefreshNights]
        }
        TrackerUiEvent::StopMissing { id } => {
            warn!(session_id = id, "Held session was deleted elsewhere");
            if state.current.as_ref().is_some_and(|current| current.id == id) {
                state.current = None;
            }
            vec![
                StateMutation::ShowNotice(Notice::error(format!(
                    "Night #{id} no longer exists"
                ))),
                StateMutation::RefreshNights,
            ]
        }
        TrackerUiEvent::Cleared => {
            info!("Sleep history cleared");
            state.current = None;
            state.pending_navigation = None;
            state.nights.clear();
            vec![StateMutation::ShowNotice(Notice::info(CLEARED_MESSAGE))]
        }
        TrackerUiEvent::NightsLoaded { nights } => {
            state.nights = nights;
            vec![]
        }
        TrackerUiEvent::Failed { op, error } => {
            warn!(op = ?op, error = %error, "Sleep store operation failed");
            if op == TrackerOp::Restore {
                // Unknown is treated as idle so the tracker stays usable.
                state.initialized = true;
            }
            vec![StateMutation::ShowNotice(Notice::error(format!(
                "Couldn't {}: {error}",
                op.describe()
            )))]
        }
    }
}

/// Maps a key press on the tracker screen to an action.
pub fn handle_key(state: &TrackerState, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if state.confirming_clear {
        return match key.code {
            KeyCode::Char('y' | 'Y') => Some(Action::ClearHistory),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::CancelClear),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('s') => Some(Action::StartTracking),
        KeyCode::Char('t') => Some(Action::StopTracking),
        KeyCode::Char('c') => Some(Action::RequestClear),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}
