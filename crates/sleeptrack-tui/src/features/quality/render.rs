use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use sleeptrack_core::SleepQuality;

use super::state::QualityState;

pub fn render_quality(frame: &mut Frame, area: Rect, state: &QualityState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" How did you sleep? (night #{}) ", state.session_id));

    let options: Vec<Span> = SleepQuality::all()
        .iter()
        .flat_map(|quality| {
            let style = if *quality == state.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            [
                Span::styled(format!(" {} {} ", quality.value(), quality.label()), style),
                Span::raw(" "),
            ]
        })
        .collect();

    let footer = if state.saving {
        Span::styled("Saving…", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            "[←/→ or 0-5] choose  [enter] save  [esc] skip",
            Style::default().fg(Color::DarkGray),
        )
    };

    let lines = vec![
        Line::default(),
        Line::from(options),
        Line::default(),
        Line::from(footer),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}
