//! Full-screen runtime: terminal event loop around [`SessionRuntime`].

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use sleeptrack_core::SharedStore;
use sleeptrack_core::config::Config;

use super::SessionRuntime;
use crate::events::UiEvent;
use crate::{render, terminal};

/// Poll interval while a store task is running.
pub const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Poll interval when idle. Also drives the elapsed-time clock.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Owns the terminal and a [`SessionRuntime`].
///
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    session: SessionRuntime,
    last_tick: Instant,
}

impl TuiRuntime {
    pub fn new(config: Config, store: SharedStore) -> Result<Self> {
        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        Ok(Self {
            terminal,
            session: SessionRuntime::new(config, store),
            last_tick: Instant::now(),
        })
    }

    /// Runs the event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.session.state().should_quit {
            if self.session.drain_inbox() {
                dirty = true;
            }

            for event in self.collect_events()? {
                if matches!(event, UiEvent::Tick | UiEvent::Terminal(_)) {
                    dirty = true;
                }
                self.session.dispatch(event);
            }

            if dirty {
                let state = self.session.state();
                self.terminal.draw(|frame| render::render(state, frame))?;
                dirty = false;
            }
        }

        self.session.shutdown();
        Ok(())
    }

    /// Polls the terminal until input arrives or the next tick is due.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.session.state().tasks.is_any_running() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };
        let poll_duration = tick_interval.saturating_sub(self.last_tick.elapsed());

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.session.shutdown();
        let _ = terminal::restore_terminal();
    }
}
