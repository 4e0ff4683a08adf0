//! Captions view: bottom-anchored rolling captions with a connection dot.
//!
//! Terminal rendition of the caption overlay's emphasis rules: the newest
//! caption is bright and bold, older active captions are dimmed a step, and
//! fading captions drop to dark gray until their removal timer fires.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::captions::Caption;
use crate::ui::truncate_to_width;

pub(super) fn draw(frame: &mut Frame<'_>, app: &App) {
    let captions = app.captions.captions();
    let caption_rows = captions.len().max(1) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(caption_rows),
        ])
        .split(frame.area());

    let dot = if app.console.connected {
        Span::styled("●", Style::default().fg(Color::Green))
    } else {
        Span::styled("●", Style::default().fg(Color::Red))
    };
    frame.render_widget(
        Paragraph::new(Line::from(dot)).alignment(Alignment::Right),
        chunks[0],
    );

    if app.captions.is_empty() {
        return;
    }

    let width = frame.area().width.saturating_sub(2) as usize;
    let last = captions.len() - 1;
    let lines: Vec<Line> = captions
        .iter()
        .enumerate()
        .map(|(idx, caption)| caption_line(caption, idx == last, width))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), chunks[2]);
}

fn caption_line(caption: &Caption, newest: bool, width: usize) -> Line<'static> {
    let style = if caption.fading {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else if newest {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(truncate_to_width(&caption.text, width), style))
}
