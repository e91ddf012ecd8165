//! Application reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyEvent, KeyEventKind};
use sleeptrack_core::SessionId;
use tracing::debug;

use crate::common::{Notice, TaskKind};
use crate::effects::UiEffect;
use crate::events::{Action, TrackerUiEvent, UiEvent};
use crate::mutations::StateMutation;
use crate::quality::{self, QualityState};
use crate::state::{AppState, Screen};
use crate::tracker;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if app
                .notice
                .as_ref()
                .is_some_and(|notice| notice.is_expired(app.config.notice_duration()))
            {
                app.notice = None;
            }
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Action(action) => handle_action(app, action),
        UiEvent::Tracker(tracker_event) => {
            let cleared = matches!(tracker_event, TrackerUiEvent::Cleared);
            let mutations = tracker::handle_tracker_event(&mut app.tracker, tracker_event);
            let mut effects = apply_mutations(app, mutations);
            if cleared && matches!(app.screen, Screen::Quality(_)) {
                app.screen = Screen::Tracker;
            }
            effects.extend(follow_navigation(app));
            effects
        }
        UiEvent::Quality(quality_event) => {
            let mutations = quality::handle_quality_event(app.quality_mut(), quality_event);
            apply_mutations(app, mutations)
        }
        UiEvent::TaskStarted { kind, started } => {
            debug!(task = kind.label(), id = started.id.0, "Task started");
            app.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                debug!(task = kind.label(), id = completed.id.0, "Dropping stale completion");
                vec![]
            }
        }
    }
}

fn handle_action(app: &mut AppState, action: Action) -> Vec<UiEffect> {
    // A fresh user action dismisses the previous notice.
    if action != Action::Quit {
        app.notice = None;
    }

    match action {
        Action::StartTracking => {
            tracker::start_tracking(&app.tracker, &app.tasks, &mut app.task_seq)
        }
        Action::StopTracking => tracker::stop_tracking(&app.tracker, &app.tasks, &mut app.task_seq),
        Action::RequestClear => tracker::request_clear(
            &mut app.tracker,
            app.config.confirm_clear,
            &app.tasks,
            &mut app.task_seq,
        ),
        Action::ClearHistory => {
            tracker::clear_history(&mut app.tracker, &app.tasks, &mut app.task_seq)
        }
        Action::CancelClear => {
            tracker::cancel_clear(&mut app.tracker);
            vec![]
        }
        Action::AcknowledgeNavigation => {
            tracker::acknowledge_navigation(&mut app.tracker);
            vec![]
        }
        Action::OpenRating { id } => open_rating(app, id),
        Action::SelectQuality(value) => {
            if let Some(state) = app.quality_mut() {
                quality::select(state, value);
            }
            vec![]
        }
        Action::RaiseQuality => {
            if let Some(state) = app.quality_mut() {
                quality::raise(state);
            }
            vec![]
        }
        Action::LowerQuality => {
            if let Some(state) = app.quality_mut() {
                quality::lower(state);
            }
            vec![]
        }
        Action::SaveQuality => match &mut app.screen {
            Screen::Quality(state) => quality::save(state, &mut app.task_seq),
            Screen::Tracker => vec![],
        },
        Action::SkipQuality => {
            let mutations = app.quality().map(quality::skip).unwrap_or_default();
            apply_mutations(app, mutations)
        }
        Action::Quit => {
            app.should_quit = true;
            vec![UiEffect::Quit]
        }
    }
}

/// Opens the rating screen for a stored, finished session.
fn open_rating(app: &mut AppState, id: SessionId) -> Vec<UiEffect> {
    if app.tracker.current.as_ref().is_some_and(|current| current.id == id) {
        app.notice = Some(Notice::error(format!(
            "Night #{id} is still being recorded"
        )));
        return vec![];
    }
    let existing = app
        .tracker
        .nights
        .iter()
        .find(|night| night.id == id)
        .and_then(|night| night.quality);
    apply_mutations(
        app,
        vec![StateMutation::OpenQuality {
            id,
            quality: existing,
        }],
    )
}

/// Reacts to the tracker's navigation signal exactly once.
fn follow_navigation(app: &mut AppState) -> Vec<UiEffect> {
    let Some(session) = app.tracker.pending_navigation.as_ref() else {
        return vec![];
    };
    let mutation = StateMutation::OpenQuality {
        id: session.id,
        quality: session.quality,
    };
    tracker::acknowledge_navigation(&mut app.tracker);
    apply_mutations(app, vec![mutation])
}

fn apply_mutations(app: &mut AppState, mutations: Vec<StateMutation>) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    for mutation in mutations {
        match mutation {
            StateMutation::ShowNotice(notice) => {
                app.notice = Some(notice);
            }
            StateMutation::RefreshNights => {
                let state = app.tasks.state(TaskKind::NightsLoad);
                if state.is_running() {
                    effects.push(UiEffect::CancelTask {
                        kind: TaskKind::NightsLoad,
                        token: state.cancel.clone(),
                    });
                }
                effects.push(UiEffect::LoadNights {
                    task: app.task_seq.next_id(),
                });
            }
            StateMutation::OpenQuality { id, quality } => {
                app.tracker.confirming_clear = false;
                app.screen = Screen::Quality(QualityState::new(id, quality));
            }
            StateMutation::ReturnToTracker => {
                app.screen = Screen::Tracker;
            }
        }
    }
    effects
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let action = match &app.screen {
        Screen::Tracker => tracker::handle_key(&app.tracker, key),
        Screen::Quality(_) => quality::handle_key(key),
    };
    match action {
        Some(action) => handle_action(app, action),
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use sleeptrack_core::config::Config;
    use sleeptrack_core::{NewSession, SleepQuality, SleepSession};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::common::{TaskCompleted, TaskId, TaskMeta, TaskStarted};
    use crate::events::QualityUiEvent;

    fn ready_app() -> AppState {
        let mut app = AppState::new(Config::default());
        app.tracker.initialized = true;
        app
    }

    fn closed(id: i64) -> SleepSession {
        NewSession::open_at(1_000).into_session(id).closed_at(9_000)
    }

    fn started(app: &mut AppState, kind: TaskKind, id: u64) -> CancellationToken {
        let cancel = CancellationToken::new();
        update(
            app,
            UiEvent::TaskStarted {
                kind,
                started: TaskStarted {
                    id: TaskId(id),
                    cancel: cancel.clone(),
                    meta: TaskMeta::None,
                },
            },
        );
        cancel
    }

    fn completed(kind: TaskKind, id: u64, result: UiEvent) -> UiEvent {
        UiEvent::TaskCompleted {
            kind,
            completed: TaskCompleted {
                id: TaskId(id),
                result: Box::new(result),
            },
        }
    }

    #[test]
    fn stop_result_opens_rating_and_acknowledges() {
        let mut app = ready_app();
        app.tracker.current = Some(NewSession::open_at(1_000).into_session(7));

        let effects = update(
            &mut app,
            UiEvent::Tracker(TrackerUiEvent::Stopped { session: closed(7) }),
        );

        assert!(matches!(effects.as_slice(), [UiEffect::LoadNights { .. }]));
        assert!(app.tracker.pending_navigation.is_none());
        assert_eq!(app.quality().map(|q| q.session_id), Some(7));
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut app = ready_app();
        started(&mut app, TaskKind::NightsLoad, 1);
        started(&mut app, TaskKind::NightsLoad, 2);

        update(
            &mut app,
            completed(
                TaskKind::NightsLoad,
                1,
                UiEvent::Tracker(TrackerUiEvent::NightsLoaded {
                    nights: vec![closed(1)],
                }),
            ),
        );
        assert!(app.tracker.nights.is_empty());
        assert!(app.tasks.nights_load.is_running());

        update(
            &mut app,
            completed(
                TaskKind::NightsLoad,
                2,
                UiEvent::Tracker(TrackerUiEvent::NightsLoaded {
                    nights: vec![closed(2)],
                }),
            ),
        );
        assert_eq!(app.tracker.nights.len(), 1);
        assert!(!app.tasks.nights_load.is_running());
    }

    #[test]
    fn refresh_cancels_running_history_load() {
        let mut app = ready_app();
        let token = started(&mut app, TaskKind::NightsLoad, 1);

        let effects = update(
            &mut app,
            UiEvent::Tracker(TrackerUiEvent::Started {
                session: Some(NewSession::open_at(5).into_session(1)),
            }),
        );

        match effects.as_slice() {
            [
                UiEffect::CancelTask {
                    kind: TaskKind::NightsLoad,
                    token: Some(cancel),
                },
                UiEffect::LoadNights { .. },
            ] => {
                cancel.cancel();
                assert!(token.is_cancelled());
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn cleared_leaves_rating_screen() {
        let mut app = ready_app();
        app.screen = Screen::Quality(QualityState::new(3, None));

        update(&mut app, UiEvent::Tracker(TrackerUiEvent::Cleared));

        assert_eq!(app.screen, Screen::Tracker);
        assert_eq!(
            app.notice.as_ref().map(|n| n.message.as_str()),
            Some(tracker::CLEARED_MESSAGE)
        );
    }

    #[test]
    fn keys_route_to_the_front_screen() {
        let mut app = ready_app();
        app.screen = Screen::Quality(QualityState::new(3, None));

        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(update(&mut app, UiEvent::Terminal(Event::Key(key))).is_empty());
        assert!(app.tracker.current.is_none());

        let key = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        update(&mut app, UiEvent::Terminal(Event::Key(key)));
        assert_eq!(
            app.quality().map(|q| q.selected),
            Some(SleepQuality::PrettyGood)
        );

        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        update(&mut app, UiEvent::Terminal(Event::Key(key)));
        assert_eq!(app.screen, Screen::Tracker);
    }

    #[test]
    fn open_rating_uses_known_quality_and_refuses_open_session() {
        let mut app = ready_app();
        app.tracker.nights = vec![closed(2).with_quality(SleepQuality::Poor)];

        update(&mut app, Action::OpenRating { id: 2 }.into());
        assert_eq!(app.quality().map(|q| q.selected), Some(SleepQuality::Poor));

        let mut app = ready_app();
        app.tracker.current = Some(NewSession::open_at(1).into_session(5));
        update(&mut app, Action::OpenRating { id: 5 }.into());
        assert_eq!(app.screen, Screen::Tracker);
        assert!(app.notice.as_ref().is_some_and(Notice::is_error));
    }

    #[test]
    fn saved_rating_returns_and_refreshes() {
        let mut app = ready_app();
        app.screen = Screen::Quality(QualityState::new(2, None));

        let effects = update(&mut app, Action::SaveQuality.into());
        assert!(matches!(effects.as_slice(), [UiEffect::SaveQuality { id: 2, .. }]));

        let effects = update(
            &mut app,
            UiEvent::Quality(QualityUiEvent::Saved {
                session: closed(2).with_quality(SleepQuality::Okay),
            }),
        );
        assert!(matches!(effects.as_slice(), [UiEffect::LoadNights { .. }]));
        assert_eq!(app.screen, Screen::Tracker);
    }

    #[test]
    fn expired_notice_clears_on_tick() {
        let mut app = ready_app();
        app.config.notice_secs = 0;
        app.notice = Some(Notice::info("hello"));

        update(&mut app, UiEvent::Tick);

        assert!(app.notice.is_none());
    }
}
