//! Effect handlers for the runtime.
//!
//! Handlers are pure async functions that return a `UiEvent`. They run the
//! store call on the blocking pool and never touch `AppState`; the runtime
//! spawns them and sends the result to its inbox.

pub mod session;

pub use session::*;
