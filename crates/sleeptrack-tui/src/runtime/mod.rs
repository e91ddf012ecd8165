//! Runtime: owns state, executes effects, collects async results.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Handlers send their result `UiEvent` to `inbox_tx`; the runtime drains
//! `inbox_rx` and feeds each event through the reducer.
//!
//! ## Lifecycle Scope
//!
//! Every runtime owns a root `CancellationToken`. Each task runs under a child
//! of it, and a task whose token is cancelled drops its result instead of
//! sending it. [`SessionRuntime::shutdown`] (also run on drop) cancels the
//! root, closes the inbox and discards anything already queued, so no result
//! lands in the state after teardown.
//!
//! Structure:
//! - `mod.rs`: headless runtime (`SessionRuntime`), effect dispatch
//! - `tui.rs`: terminal event loop on top of `SessionRuntime`
//! - `inbox.rs`: inbox channel types
//! - `handlers/`: store handlers

mod handlers;
mod inbox;
mod tui;

use std::future::Future;
use std::sync::Arc;

use inbox::{UiEventReceiver, UiEventSender};
use sleeptrack_core::SharedStore;
use sleeptrack_core::config::Config;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
pub use tui::TuiRuntime;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskMeta, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{tracker, update};

/// Headless runtime: the tracker without a terminal.
///
/// The CLI subcommands and the tests drive it directly; [`TuiRuntime`] wraps
/// it with a render loop. Must be created inside a tokio runtime.
pub struct SessionRuntime {
    state: AppState,
    store: SharedStore,
    /// Root of every task's cancellation token.
    scope: CancellationToken,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    closed: bool,
}

impl SessionRuntime {
    /// Creates the runtime and issues the startup restore.
    pub fn new(config: Config, store: SharedStore) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let mut runtime = Self {
            state: AppState::new(config),
            store,
            scope: CancellationToken::new(),
            inbox_tx,
            inbox_rx,
            closed: false,
        };
        let effects = tracker::initialize(
            &runtime.state.tracker,
            &runtime.state.tasks,
            &mut runtime.state.task_seq,
        );
        runtime.execute_effects(effects);
        runtime
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed
    }

    /// Feeds one event through the reducer. Ignored after teardown.
    pub fn dispatch(&mut self, event: impl Into<UiEvent>) {
        if self.closed {
            debug!("Event ignored: runtime shut down");
            return;
        }
        self.dispatch_event(event.into());
    }

    /// Applies every result already waiting in the inbox.
    ///
    /// Returns whether anything was applied.
    pub fn drain_inbox(&mut self) -> bool {
        let mut applied = false;
        while !self.closed {
            let Ok(event) = self.inbox_rx.try_recv() else {
                break;
            };
            self.dispatch_event(event);
            applied = true;
        }
        applied
    }

    /// Waits until no task is running, applying results as they arrive.
    pub async fn settle(&mut self) {
        loop {
            self.drain_inbox();
            if self.closed || !self.state.tasks.is_any_running() {
                return;
            }
            match self.inbox_rx.recv().await {
                Some(event) => self.dispatch_event(event),
                None => return,
            }
        }
    }

    /// Cancels every task and discards pending results.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        debug!(running = ?self.state.tasks.running(), "Shutting down runtime");
        self.closed = true;
        self.scope.cancel();
        self.inbox_rx.close();
        while self.inbox_rx.try_recv().is_ok() {}
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a store task with a uniform TaskStarted/TaskCompleted lifecycle.
    ///
    /// `TaskStarted` is applied before returning, so `settle` sees the task
    /// as running right away.
    fn spawn_task<F, Fut>(&mut self, kind: TaskKind, id: TaskId, meta: TaskMeta, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let cancel = self.scope.child_token();
        self.dispatch_event(UiEvent::TaskStarted {
            kind,
            started: TaskStarted {
                id,
                cancel: cancel.clone(),
                meta,
            },
        });

        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(task = kind.label(), id = id.0, "Task cancelled");
                }
                result = f() => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let completed = TaskCompleted {
                        id,
                        result: Box::new(result),
                    };
                    let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
                }
            }
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        let store = Arc::clone(&self.store);
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::CancelTask { kind, token } => {
                debug!(task = kind.label(), "Cancelling task");
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
            UiEffect::LoadOpenSession { task } => {
                self.spawn_task(TaskKind::TrackerInit, task, TaskMeta::None, move || {
                    handlers::load_open_session(store)
                });
            }
            UiEffect::StartSession { task } => {
                self.spawn_task(TaskKind::StartSession, task, TaskMeta::None, move || {
                    handlers::start_session(store)
                });
            }
            UiEffect::StopSession { task, session } => {
                let meta = TaskMeta::Session { id: session.id };
                self.spawn_task(TaskKind::StopSession, task, meta, move || {
                    handlers::stop_session(store, session)
                });
            }
            UiEffect::ClearHistory { task } => {
                self.spawn_task(TaskKind::ClearHistory, task, TaskMeta::None, move || {
                    handlers::clear_history(store)
                });
            }
            UiEffect::LoadNights { task } => {
                self.spawn_task(TaskKind::NightsLoad, task, TaskMeta::None, move || {
                    handlers::load_nights(store)
                });
            }
            UiEffect::SaveQuality { task, id, quality } => {
                self.spawn_task(TaskKind::QualitySave, task, TaskMeta::Session { id }, move || {
                    handlers::save_quality(store, id, quality)
                });
            }
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
