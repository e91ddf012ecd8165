//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent store I/O and task control only (no direct state mutation),
//! which keeps the reducer pure: it never reads the clock, touches the store
//! or spawns tasks.

use sleeptrack_core::{SessionId, SleepQuality, SleepSession};
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Tear the runtime down.
    Quit,

    /// Read the most recent session and adopt it if unfinished.
    LoadOpenSession { task: TaskId },

    /// Insert a new open session stamped with the current time, then re-read.
    StartSession { task: TaskId },

    /// Close `session` at the current time and persist it.
    StopSession { task: TaskId, session: SleepSession },

    /// Delete every session.
    ClearHistory { task: TaskId },

    /// Reload the full history list.
    LoadNights { task: TaskId },

    /// Load session `id`, set its quality and persist it.
    SaveQuality {
        task: TaskId,
        id: SessionId,
        quality: SleepQuality,
    },

    /// Cancel an in-flight task; its result will be discarded.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
