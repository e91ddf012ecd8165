//! Application state composition.
//!
//! ```text
//! AppState
//! ├── config: Config          (display + behaviour settings)
//! ├── tracker: TrackerState   (current session, history, navigation signal)
//! ├── screen: Screen          (tracker or the rating screen)
//! ├── notice: Option<Notice>  (transient status line)
//! ├── task_seq: TaskSeq       (async task id generator)
//! └── tasks: Tasks            (task lifecycle state)
//! ```

use sleeptrack_core::config::Config;

use crate::common::{Notice, TaskSeq, Tasks};
use crate::quality::QualityState;
use crate::tracker::TrackerState;

/// Which screen is in front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Tracker,
    Quality(QualityState),
}

/// Combined application state, owned by the runtime.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub tracker: TrackerState,
    pub screen: Screen,
    pub notice: Option<Notice>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tracker: TrackerState::default(),
            screen: Screen::Tracker,
            notice: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            should_quit: false,
        }
    }

    /// The rating screen state, when it is in front.
    pub fn quality(&self) -> Option<&QualityState> {
        match &self.screen {
            Screen::Quality(state) => Some(state),
            Screen::Tracker => None,
        }
    }

    pub fn quality_mut(&mut self) -> Option<&mut QualityState> {
        match &mut self.screen {
            Screen::Quality(state) => Some(state),
            Screen::Tracker => None,
        }
    }
}
