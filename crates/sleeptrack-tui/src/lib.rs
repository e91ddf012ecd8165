//! Sleep tracker state machine and its full-screen terminal UI.
//!
//! The tracker is an Elm-style reducer (`update`) over `AppState`. Store I/O
//! is expressed as effects that a runtime executes: [`SessionRuntime`] runs
//! them headless (CLI subcommands, tests) and [`TuiRuntime`] adds the terminal.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod mutations;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use events::{Action, UiEvent};
pub use features::{quality, tracker};
pub use runtime::{SessionRuntime, TuiRuntime};
use sleeptrack_core::SharedStore;
use sleeptrack_core::config::Config;
pub use state::{AppState, Screen};

/// Runs the interactive tracker until the user quits.
///
/// Must be called inside a multi-threaded tokio runtime: the event loop blocks
/// its thread while store tasks run on the workers.
pub fn run_interactive(config: Config, store: SharedStore) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The tracker UI requires a terminal.\n\
             Use `sleeptrack start` / `sleeptrack stop` for non-interactive use."
        );
    }

    let mut runtime = TuiRuntime::new(config, store)?;
    runtime.run()
}
