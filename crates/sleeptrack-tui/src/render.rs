//! Pure view functions.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::quality::render_quality;
use crate::state::{AppState, Screen};
use crate::tracker::render_tracker;

const TITLE_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;

/// Renders the whole UI.
pub fn render(app: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(5),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    render_title(app, frame, chunks[0]);
    match &app.screen {
        Screen::Tracker => render_tracker(
            frame,
            chunks[1],
            &app.tracker,
            &app.config.time_format,
        ),
        Screen::Quality(state) => render_quality(frame, chunks[1], state),
    }
    render_status(app, frame, chunks[2]);
}

fn render_title(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        " sleeptrack ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.tracker.is_recording() {
        spans.push(Span::styled("● REC", Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Notice line; falls back to the running task, if any.
fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let line = if let Some(notice) = &app.notice {
        let color = if notice.is_error() {
            Color::Red
        } else {
            Color::Green
        };
        Line::from(Span::styled(
            format!(" {}", notice.message),
            Style::default().fg(color),
        ))
    } else if let Some(label) = app.tasks.status_label() {
        Line::from(Span::styled(
            format!(" {label}…"),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}
