//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
};
use textwrap::{Options, wrap};

use crate::theme::Theme;

/// Wrap text to `width` display columns, one string per row
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let rows: Vec<String> =
        wrap(text, Options::new(width)).into_iter().map(|s| s.into_owned()).collect();
    if rows.is_empty() { vec![String::new()] } else { rows }
}

/// Plain text of a rendered line
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

/// Display width of a string in terminal cells
pub fn text_width(text: &str) -> u16 {
    textwrap::core::display_width(text).min(u16::MAX as usize) as u16
}

/// Draw a scrollbar indicator
pub fn draw_scrollbar(
    frame: &mut Frame,
    x: u16,
    y: u16,
    height: u16,
    scroll_offset: usize,
    total_lines: usize,
    theme: &Theme,
) {
    let height = height as usize;
    if total_lines <= height || height == 0 {
        return;
    }

    let thumb_height = ((height * height).div_ceil(total_lines)).max(1);
    let max_scroll = total_lines - height;
    let thumb_top = ((height - thumb_height) * scroll_offset.min(max_scroll)) / max_scroll;

    for i in 0..height {
        let thumb = i >= thumb_top && i < thumb_top + thumb_height;
        let (ch, style) = if thumb {
            ("█", Style::default().fg(theme.accent_secondary))
        } else {
            ("░", Style::default().fg(theme.bg_tertiary))
        };
        frame.render_widget(
            Paragraph::new(ch).style(style),
            Rect { x, y: y.saturating_add(i as u16), width: 1, height: 1 },
        );
    }
}

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::text::Span;

    #[test]
    fn wrap_text_short() {
        assert_eq!(wrap_text("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn wrap_text_long() {
        let result = wrap_text("this is a longer text that needs wrapping", 20);
        assert!(result.len() > 1);
        for line in &result {
            assert!(text_width(line) <= 20);
        }
    }

    #[test]
    fn wrap_text_measures_cells_not_bytes() {
        // Harakat take no columns, so the verse fits in ten cells
        assert_eq!(wrap_text("أُصَدِّقُ كِتابي", 10).len(), 1);
    }

    #[test]
    fn wrap_text_empty_and_zero_width() {
        assert_eq!(wrap_text("", 20), vec![""]);
        assert_eq!(wrap_text("hello", 0), vec!["hello"]);
    }

    #[test]
    fn line_text_joins_spans() {
        let line = Line::from(vec![Span::raw("• "), Span::raw("نص")]);
        assert_eq!(line_text(&line), "• نص");
    }

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert!(inner.x >= 20 && inner.right() <= 80);
        assert_eq!(inner.height, 20);
    }
}
