use sleeptrack_core::SessionId;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Startup read of the most recent session.
    TrackerInit,
    StartSession,
    StopSession,
    ClearHistory,
    NightsLoad,
    QualitySave,
}

impl TaskKind {
    pub fn all() -> &'static [TaskKind] {
        &[
            TaskKind::TrackerInit,
            TaskKind::StartSession,
            TaskKind::StopSession,
            TaskKind::ClearHistory,
            TaskKind::NightsLoad,
            TaskKind::QualitySave,
        ]
    }

    /// Short label for the status line.
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::TrackerInit => "Restoring",
            TaskKind::StartSession => "Starting",
            TaskKind::StopSession => "Stopping",
            TaskKind::ClearHistory => "Clearing",
            TaskKind::NightsLoad => "Loading history",
            TaskKind::QualitySave => "Saving rating",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum TaskMeta {
    #[default]
    None,
    Session {
        id: SessionId,
    },
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: CancellationToken,
    pub meta: TaskMeta,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
    pub meta: TaskMeta,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.active = Some(started.id);
        self.cancel = Some(started.cancel.clone());
        self.meta = started.meta.clone();
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
        self.meta = TaskMeta::None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub tracker_init: TaskState,
    pub start_session: TaskState,
    pub stop_session: TaskState,
    pub clear_history: TaskState,
    pub nights_load: TaskState,
    pub quality_save: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::TrackerInit => &self.tracker_init,
            TaskKind::StartSession => &self.start_session,
            TaskKind::StopSession => &self.stop_session,
            TaskKind::ClearHistory => &self.clear_history,
            TaskKind::NightsLoad => &self.nights_load,
            TaskKind::QualitySave => &self.quality_save,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::TrackerInit => &mut self.tracker_init,
            TaskKind::StartSession => &mut self.start_session,
            TaskKind::StopSession => &mut self.stop_session,
            TaskKind::ClearHistory => &mut self.clear_history,
            TaskKind::NightsLoad => &mut self.nights_load,
            TaskKind::QualitySave => &mut self.quality_save,
        }
    }

    pub fn is_any_running(&self) -> bool {
        TaskKind::all()
            .iter()
            .any(|kind| self.state(*kind).is_running())
    }

    /// The first running task, for status display.
    pub fn running(&self) -> Option<TaskKind> {
        TaskKind::all()
            .iter()
            .copied()
            .find(|kind| self.state(*kind).is_running())
    }

    /// Status line text for the first running task, naming its night if any.
    pub fn status_label(&self) -> Option<String> {
        let kind = self.running()?;
        Some(match self.state(kind).meta {
            TaskMeta::Session { id } => format!("{} night #{id}", kind.label()),
            TaskMeta::None => kind.label().to_string(),
        })
    }
}
