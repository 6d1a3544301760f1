//! Command line UI component

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::layout::text_width;
use crate::app::state::{CommandLineState, CommandMode};
use crate::theme::Theme;

/// Shown when there is nothing else to say
const HINT: &str = "اضغط : للأوامر، ? للمساعدة، اسحب بالفأرة لتحديد نص";

/// Draw the command line at the bottom of the screen
pub fn draw(frame: &mut Frame, area: Rect, state: &CommandLineState, mode: &str, theme: &Theme) {
    let badge = format!(" {mode} ");
    let [text_area, badge_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(text_width(&badge))])
            .areas(area);

    let line = match state.mode {
        CommandMode::Normal => {
            let (text, style) = match &state.message {
                Some(msg) if state.is_error => (msg.clone(), Style::default().fg(theme.error)),
                Some(msg) => (msg.clone(), Style::default().fg(theme.fg_secondary)),
                None => (HINT.to_string(), Style::default().fg(theme.fg_muted)),
            };
            Line::from(Span::styled(text, style))
        }
        CommandMode::Command => {
            let text = format!(":{}", state.input.text());
            let style = Style::default().fg(theme.accent_primary);
            build_line_with_cursor(&text, state.input.cursor() + 1, style, theme) // +1 for prefix
        }
    };

    frame.render_widget(Paragraph::new(line), text_area);
    frame.render_widget(
        Paragraph::new(badge).style(
            Style::default().fg(theme.bg_primary).bg(theme.accent_secondary).add_modifier(Modifier::BOLD),
        ),
        badge_area,
    );
}

/// Build a line with a visible cursor at character `cursor_pos`
pub fn build_line_with_cursor(
    text: &str,
    cursor_pos: usize,
    base_style: Style,
    theme: &Theme,
) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();

    if cursor_pos > 0 {
        let before: String = chars.iter().take(cursor_pos).collect();
        spans.push(Span::styled(before, base_style));
    }

    // Cursor character (or space if at end)
    let cursor_char = chars.get(cursor_pos).copied().unwrap_or(' ');
    let cursor_style =
        Style::default().fg(theme.bg_primary).bg(theme.cursor).add_modifier(Modifier::BOLD);
    spans.push(Span::styled(cursor_char.to_string(), cursor_style));

    if cursor_pos + 1 < chars.len() {
        let after: String = chars.iter().skip(cursor_pos + 1).collect();
        spans.push(Span::styled(after, base_style));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_cursor_at_start() {
        let theme = Theme::default();
        let line = build_line_with_cursor(":test", 0, Style::default(), &theme);
        assert_eq!(line.spans.len(), 2); // cursor + rest
    }

    #[test]
    fn build_cursor_at_end() {
        let theme = Theme::default();
        let line = build_line_with_cursor(":test", 5, Style::default(), &theme);
        assert_eq!(line.spans.len(), 2); // before + cursor (space)
    }

    #[test]
    fn build_cursor_counts_characters() {
        let theme = Theme::default();
        let line = build_line_with_cursor(":درس", 2, Style::default(), &theme);
        assert_eq!(line.spans[0].content, ":د");
        assert_eq!(line.spans[1].content, "ر");
        assert_eq!(line.spans[2].content, "س");
    }
}
