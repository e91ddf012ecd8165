//! Tracker slice state.

use sleeptrack_core::SleepSession;

/// Observable state of the sleep tracker.
#[derive(Debug, Default, Clone)]
pub struct TrackerState {
    /// The open session, if one is being recorded.
    pub current: Option<SleepSession>,
    /// A finished session awaiting its quality rating.
    ///
    /// Set by stop; cleared by `acknowledge_navigation` once the rating screen
    /// has been shown, so it never triggers twice.
    pub pending_navigation: Option<SleepSession>,
    /// Full history, newest first.
    pub nights: Vec<SleepSession>,
    /// Whether the startup read has completed.
    pub initialized: bool,
    /// Whether the "clear everything?" prompt is showing.
    pub confirming_clear: bool,
}

impl TrackerState {
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    pub fn start_enabled(&self) -> bool {
        self.current.is_none()
    }

    pub fn stop_enabled(&self) -> bool {
        self.current.is_some()
    }

    pub fn clear_enabled(&self) -> bool {
        !self.nights.is_empty()
    }
}
