//! Cross-slice state mutations.
//!
//! Feature reducers return these to request changes outside their own slice.
//! The main reducer applies them in order.

use sleeptrack_core::{SessionId, SleepQuality};

use crate::common::Notice;

#[derive(Debug)]
pub enum StateMutation {
    ShowNotice(Notice),
    /// Reload the history list.
    RefreshNights,
    /// Switch to the rating screen for a session.
    OpenQuality {
        id: SessionId,
        quality: Option<SleepQuality>,
    },
    /// Leave the rating screen.
    ReturnToTracker,
}
