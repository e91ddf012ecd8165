//! Feature slices (state/update/render per slice).

pub mod quality;
pub mod tracker;
