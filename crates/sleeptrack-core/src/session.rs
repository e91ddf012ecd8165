//! Sleep session records.
//!
//! A session is "open" while its end timestamp equals its start timestamp.
//! That sentinel is what the store persists, so it is honoured exactly here;
//! everything above this module asks for [`SleepSession::status`] instead of
//! comparing timestamps itself.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::quality::SleepQuality;

/// Store-assigned session identifier.
pub type SessionId = i64;

/// Whether a session is still being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// A persisted sleep session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSession {
    pub id: SessionId,
    pub start_time_millis: i64,
    pub end_time_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<SleepQuality>,
}

impl SleepSession {
    pub fn status(&self) -> SessionStatus {
        if self.start_time_millis == self.end_time_millis {
            SessionStatus::Open
        } else {
            SessionStatus::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == SessionStatus::Open
    }

    /// Returns a copy closed at `now_millis`.
    ///
    /// The end always lands after the start, even if the wall clock stepped
    /// back or the stop arrived in the same millisecond: a closed session
    /// must never read as open.
    #[must_use]
    pub fn closed_at(&self, now_millis: i64) -> Self {
        Self {
            end_time_millis: now_millis.max(self.start_time_millis + 1),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_quality(&self, quality: SleepQuality) -> Self {
        Self {
            quality: Some(quality),
            ..self.clone()
        }
    }

    /// Recorded duration in milliseconds (zero while open).
    pub fn duration_millis(&self) -> i64 {
        (self.end_time_millis - self.start_time_millis).max(0)
    }
}

/// Insert payload: a session before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub start_time_millis: i64,
    pub end_time_millis: i64,
    pub quality: Option<SleepQuality>,
}

impl NewSession {
    /// An open session starting at `now_millis`.
    pub fn open_at(now_millis: i64) -> Self {
        Self {
            start_time_millis: now_millis,
            end_time_millis: now_millis,
            quality: None,
        }
    }

    pub fn into_session(self, id: SessionId) -> SleepSession {
        SleepSession {
            id,
            start_time_millis: self.start_time_millis,
            end_time_millis: self.end_time_millis,
            quality: self.quality,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_timestamps_mean_open() {
        let session = NewSession::open_at(1_000).into_session(1);
        assert_eq!(session.status(), SessionStatus::Open);
        assert_eq!(session.duration_millis(), 0);
    }

    #[test]
    fn closed_at_never_precedes_start() {
        let session = NewSession::open_at(5_000).into_session(1);

        let closed = session.closed_at(9_000);
        assert_eq!(closed.end_time_millis, 9_000);
        assert_eq!(closed.status(), SessionStatus::Closed);

        let clock_went_back = session.closed_at(4_000);
        assert_eq!(clock_went_back.end_time_millis, 5_001);
        assert!(!session.closed_at(5_000).is_open());
    }

    #[test]
    fn with_quality_keeps_timestamps() {
        let session = NewSession::open_at(1).into_session(7).closed_at(10);
        let rated = session.with_quality(SleepQuality::Excellent);
        assert_eq!(rated.id, 7);
        assert_eq!(rated.end_time_millis, 10);
        assert_eq!(rated.quality, Some(SleepQuality::Excellent));
    }
}
