//! Sleep tracker feature: the session-tracking state machine.

mod render;
mod state;
mod update;

pub use render::render_tracker;
pub use state::TrackerState;
pub use update::*;
