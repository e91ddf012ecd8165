//! Sleep quality screen: rates a finished session.

mod render;
mod state;
mod update;

pub use render::render_quality;
pub use state::QualityState;
pub use update::*;
