//! Tracker screen rendering.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use sleeptrack_core::format::{self, format_hms};
use sleeptrack_core::session::now_millis;

use super::state::TrackerState;

/// Height of the current-session panel (border + two lines).
const CURRENT_HEIGHT: u16 = 4;

/// Renders the tracker screen into `area`.
pub fn render_tracker(frame: &mut Frame, area: Rect, state: &TrackerState, time_format: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(CURRENT_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_current(frame, chunks[0], state, time_format);
    render_history(frame, chunks[1], state, time_format);
    frame.render_widget(Paragraph::new(key_hints(state)), chunks[2]);
}

fn render_current(frame: &mut Frame, area: Rect, state: &TrackerState, time_format: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tonight ");

    let lines = match (&state.current, state.initialized) {
        (_, false) => vec![Line::from(Span::styled(
            "Checking for an unfinished session…",
            Style::default().fg(Color::DarkGray),
        ))],
        (Some(current), true) => {
            let started = format::format_timestamp(current.start_time_millis, time_format, &Local);
            let elapsed = format_hms(now_millis() - current.start_time_millis);
            vec![
                Line::from(vec![
                    Span::styled("● Recording", Style::default().fg(Color::Red)),
                    Span::raw(format!("  since {started}")),
                ]),
                Line::from(format!("Elapsed {elapsed}")),
            ]
        }
        (None, true) => vec![Line::from("Not recording. Press s when you go to bed.")],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_history(frame: &mut Frame, area: Rect, state: &TrackerState, time_format: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" History ({}) ", state.nights.len()));

    if state.nights.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No nights recorded yet.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::new();
    for night in &state.nights {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let title = if night.is_open() {
            format!("Night #{} (in progress)", night.id)
        } else {
            format!(
                "Night #{}: {}",
                night.id,
                format::describe_duration(night.start_time_millis, night.end_time_millis, &Local)
            )
        };
        lines.push(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(
            format::format_night(night, time_format, &Local)
                .into_iter()
                .map(Line::from),
        );
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn key_hints(state: &TrackerState) -> Line<'static> {
    if state.confirming_clear {
        return Line::from(Span::styled(
            "Erase all sleep data? [y] yes  [n] no",
            Style::default().fg(Color::Yellow),
        ));
    }

    let hint = |key: &str, label: &str, enabled: bool| {
        let style = if enabled {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!("[{key}] {label}  "), style)
    };

    Line::from(vec![
        hint("s", "start", state.start_enabled()),
        hint("t", "stop", state.stop_enabled()),
        hint("c", "clear", state.clear_enabled()),
        hint("q", "quit", true),
    ])
}
