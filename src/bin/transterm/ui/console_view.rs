//! Console view: connection header, configuration controls, log and
//! transcript panes, and the transient status bar.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::console::ConsoleState;
use crate::settings::{model_label, SettingsItem, SETTINGS_ITEMS};
use crate::ui::truncate_to_width;

const ACCENT: Color = Color::Rgb(140, 120, 255);
const DIM_BORDER: Color = Color::Rgb(90, 80, 140);
const TEXT: Color = Color::Rgb(210, 205, 200);
const MUTED: Color = Color::Rgb(140, 135, 130);

pub(super) fn draw(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], &app.console);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_controls(frame, body[0], app);

    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);

    draw_tail_pane(
        frame,
        panes[0],
        "Server logs",
        app.console.logs(),
        "No logs received...",
    );
    draw_tail_pane(
        frame,
        panes[1],
        "Live transcription",
        app.console.transcript.iter().map(String::as_str),
        "No transcription received...",
    );

    draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, console: &ConsoleState) {
    let (dot_style, label) = if console.connected {
        (
            Style::default().fg(Color::Green),
            "Connected to server",
        )
    } else {
        (Style::default().fg(Color::Red), "Disconnected from server")
    };
    let mut spans = vec![
        Span::styled("● ", dot_style),
        Span::styled(label, Style::default().fg(TEXT)),
    ];
    if console.connected {
        spans.push(Span::styled("  ·  ", Style::default().fg(MUTED)));
        spans.push(if console.session_active {
            Span::styled("transcription running", Style::default().fg(Color::Green))
        } else {
            Span::styled("transcription stopped", Style::default().fg(MUTED))
        });
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT))
            .title(Span::styled(
                " Live Translation ",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
    );
    frame.render_widget(header, area);
}

fn draw_controls(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(DIM_BORDER))
        .title(Span::styled(
            " Configuration ",
            Style::default().fg(ACCENT),
        ));

    if !app.console.config_loaded {
        let placeholder = Paragraph::new(Span::styled(
            "Loading configuration...",
            Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let inner_width = area.width.saturating_sub(4) as usize;
    let lines: Vec<Line> = SETTINGS_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, item)| control_line(app, idx, *item, inner_width))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn control_line(app: &App, idx: usize, item: SettingsItem, width: usize) -> Line<'static> {
    let console = &app.console;
    let selected = idx == app.selected_setting;
    let value = match item {
        SettingsItem::Model => {
            let key = console
                .pending_model
                .as_deref()
                .unwrap_or(&console.config.model_name);
            model_label(key).to_string()
        }
        SettingsItem::UseGpu => if console.config.use_gpu { "on" } else { "off" }.to_string(),
        SettingsItem::Microphone => console
            .selected_microphone_label()
            .unwrap_or_else(|| "none selected".to_string()),
        SettingsItem::SampleRate => format!("{} Hz", console.config.sample_rate),
        SettingsItem::ChunkDuration => format!("{:.1} s", console.config.chunk_duration),
        SettingsItem::VolumeThreshold => format!("{:.2}", console.config.volume_threshold),
    };

    let marker = if selected { "▸ " } else { "  " };
    let text = truncate_to_width(&format!("{marker}{:<16} ‹ {value} ›", item.label()), width);
    let style = if !console.connected {
        Style::default().fg(MUTED).add_modifier(Modifier::DIM)
    } else if selected {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT)
    };
    Line::from(Span::styled(text, style))
}

/// Bottom-following pane: renders only the newest lines that fit.
fn draw_tail_pane<'a>(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    lines: impl Iterator<Item = &'a str>,
    placeholder: &str,
) {
    let visible_rows = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let all: Vec<&str> = lines.collect();
    let tail_start = all.len().saturating_sub(visible_rows);

    let text = if all.is_empty() {
        Text::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let lines: Vec<Line> = all[tail_start..]
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    truncate_to_width(line, inner_width),
                    Style::default().fg(TEXT),
                ))
            })
            .collect();
        Text::from(lines)
    };

    let pane = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(DIM_BORDER))
            .title(Span::styled(format!(" {title} "), Style::default().fg(ACCENT))),
    );
    frame.render_widget(pane, area);
}

fn draw_status_bar(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let content = match &app.status {
        Some(message) => Span::styled(
            message.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(
            "Tab views · ↑↓ select · ←→ adjust · Enter apply · s start/stop · p ping · c connect · q quit",
            Style::default().fg(MUTED),
        ),
    };
    let bar = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(DIM_BORDER)),
    );
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use transterm::protocol::TranslationConfig;

    fn render(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("test terminal");
        terminal
            .draw(|frame| crate::ui::draw(frame, app))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn placeholder_renders_until_config_is_loaded() {
        let app = App::new(None);
        let symbols = render(&app, 100, 24);
        assert!(symbols.contains("Loading configuration..."));
        assert!(!symbols.contains("Whisper model"));
    }

    #[test]
    fn loaded_config_renders_its_exact_values() {
        let mut app = App::new(None);
        app.console.adopt_saved_config(TranslationConfig {
            model_name: "medium".to_string(),
            sample_rate: 22_050,
            ..TranslationConfig::default()
        });
        app.console.config_loaded = true;
        let symbols = render(&app, 110, 24);
        assert!(symbols.contains("Medium (GPU recommended)"));
        assert!(symbols.contains("22050 Hz"));
    }

    #[test]
    fn header_reflects_connection_state() {
        let mut app = App::new(None);
        app.console.config_loaded = true;
        let symbols = render(&app, 100, 24);
        assert!(symbols.contains("Disconnected from server"));

        app.console.on_connected();
        let symbols = render(&app, 100, 24);
        assert!(symbols.contains("Connected to server"));
        assert!(symbols.contains("transcription stopped"));
    }

    #[test]
    fn panes_show_placeholders_then_follow_the_tail() {
        let mut app = App::new(None);
        app.console.config_loaded = true;
        let symbols = render(&app, 110, 24);
        assert!(symbols.contains("No logs received..."));
        assert!(symbols.contains("No transcription received..."));

        for i in 0..150 {
            app.console.push_log("10:00:00", &format!("line {i}"));
        }
        let symbols = render(&app, 110, 24);
        assert!(symbols.contains("line 149"));
        assert!(!symbols.contains("line 50 "));
    }

    #[test]
    fn status_message_replaces_the_key_hints() {
        let mut app = App::new(None);
        app.console.config_loaded = true;
        app.status = Some("Connected to server".to_string());
        let symbols = render(&app, 110, 24);
        assert!(symbols.contains("Connected to server"));
    }
}
