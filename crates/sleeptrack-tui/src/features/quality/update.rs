//! Quality screen reducer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sleeptrack_core::SleepQuality;
use tracing::{info, warn};

use super::state::QualityState;
use crate::common::{Notice, TaskSeq};
use crate::effects::UiEffect;
use crate::events::{Action, QualityUiEvent};
use crate::mutations::StateMutation;

pub fn select(state: &mut QualityState, quality: SleepQuality) {
    if !state.saving {
        state.selected = quality;
    }
}

pub fn raise(state: &mut QualityState) {
    select(state, state.selected.raise());
}

pub fn lower(state: &mut QualityState) {
    select(state, state.selected.lower());
}

/// Persists the selected rating.
pub fn save(state: &mut QualityState, seq: &mut TaskSeq) -> Vec<UiEffect> {
    if state.saving {
        return vec![];
    }
    state.saving = true;
    vec![UiEffect::SaveQuality {
        task: seq.next_id(),
        id: state.session_id,
        quality: state.selected,
    }]
}

/// Leaves without rating.
pub fn skip(state: &QualityState) -> Vec<StateMutation> {
    if state.saving {
        return vec![];
    }
    vec![StateMutation::ReturnToTracker]
}

/// Applies a store result to the rating screen.
///
/// `state` is `None` when the screen was already left; the result still
/// refreshes history but does not navigate.
pub fn handle_quality_event(
    state: Option<&mut QualityState>,
    event: QualityUiEvent,
) -> Vec<StateMutation> {
    let on_screen = state.is_some();
    match event {
        QualityUiEvent::Saved { session } => {
            let label = session.quality.map_or("not rated", SleepQuality::label);
            info!(session_id = session.id, quality = label, "Sleep quality saved");
            let mut mutations = vec![
                StateMutation::RefreshNights,
                StateMutation::ShowNotice(Notice::info(format!(
                    "Night #{} rated: {label}",
                    session.id
                ))),
            ];
            if on_screen {
                mutations.push(StateMutation::ReturnToTracker);
            }
            mutations
        }
        QualityUiEvent::Missing { id } => {
            warn!(session_id = id, "Session to rate no longer exists");
            let mut mutations = vec![StateMutation::ShowNotice(Notice::error(format!(
                "Night #{id} no longer exists"
            )))];
            if on_screen {
                mutations.push(StateMutation::ReturnToTracker);
            }
            mutations
        }
        QualityUiEvent::SaveFailed { error } => {
            warn!(error = %error, "Saving sleep quality failed");
            if let Some(state) = state {
                state.saving = false;
            }
            vec![StateMutation::ShowNotice(Notice::error(format!(
                "Couldn't save rating: {error}"
            )))]
        }
    }
}

/// Maps a key press on the quality screen to an action.
pub fn handle_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Left | KeyCode::Down | KeyCode::Char('h' | 'j') => Some(Action::LowerQuality),
        KeyCode::Right | KeyCode::Up | KeyCode::Char('l' | 'k') => Some(Action::RaiseQuality),
        KeyCode::Char(c @ '0'..='5') => c
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(SleepQuality::from_value)
            .map(Action::SelectQuality),
        KeyCode::Enter => Some(Action::SaveQuality),
        KeyCode::Esc => Some(Action::SkipQuality),
        _ => None,
    }
}
