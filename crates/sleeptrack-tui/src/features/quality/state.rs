use sleeptrack_core::{SessionId, SleepQuality};

/// Rating screen state for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityState {
    pub session_id: SessionId,
    pub selected: SleepQuality,
    /// A save is in flight; further saves are ignored.
    pub saving: bool,
}

impl QualityState {
    /// Starts on the session's existing rating, or the middle of the scale.
    pub fn new(session_id: SessionId, existing: Option<SleepQuality>) -> Self {
        Self {
            session_id,
            selected: existing.unwrap_or_default(),
            saving: false,
        }
    }
}
