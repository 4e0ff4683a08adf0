//! ratatui rendering for the two views.

mod captions_view;
mod console_view;

use ratatui::Frame;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, View};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    match app.view {
        View::Console => console_view::draw(frame, app),
        View::Captions => captions_view::draw(frame, app),
    }
}

/// Clip a line to the given display width, marking truncation with an ellipsis.
pub(crate) fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let limit = max_width.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > limit {
            break;
        }
        width += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_pass_through_untouched() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello", 5), "hello");
    }

    #[test]
    fn long_lines_clip_with_an_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
    }

    #[test]
    fn wide_characters_count_their_display_width() {
        // Each ideograph is two columns wide.
        assert_eq!(truncate_to_width("你好世界", 5), "你好…");
    }
}
