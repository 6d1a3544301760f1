//! Chat panel: conversation and input box

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::command_line::build_line_with_cursor;
use super::layout::{draw_scrollbar, wrap_text};
use super::markdown::render_markdown;
use crate::api::{Message, Role};
use crate::app::chat::PRESET_PROMPTS;
use crate::app::state::AppState;
use crate::theme::Theme;

/// Height of the input box including borders
const INPUT_HEIGHT: u16 = 3;

/// Draw the chat panel
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme, focused: bool) {
    let border_color = if focused { theme.border_focused } else { theme.border };
    let title = if state.chat.is_streaming() { " المساعد (يكتب...) " } else { " المساعد " };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    state.hits.chat = area;

    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(INPUT_HEIGHT)]).areas(inner);

    draw_messages(frame, messages_area, state, theme);
    draw_input(frame, input_area, state, theme, focused);
}

fn draw_messages(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let width = area.width.saturating_sub(2) as usize;
    let lines = conversation_lines(state, theme, width);

    let visible = area.height as usize;
    let total = lines.len();
    let max_scroll = total.saturating_sub(visible);

    // Scroll counts lines up from the bottom, so new text stays in view
    let scroll = state.chat.scroll.min(max_scroll);
    state.chat.scroll = scroll;
    let top = max_scroll - scroll;

    let visible_lines: Vec<Line<'static>> = lines.into_iter().skip(top).take(visible).collect();
    let text_area = Rect { width: area.width.saturating_sub(1), ..area };
    frame.render_widget(Paragraph::new(visible_lines), text_area);

    draw_scrollbar(frame, area.right().saturating_sub(1), area.y, area.height, top, total, theme);
}

/// Styled lines for the whole conversation
pub fn conversation_lines(state: &AppState, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let muted = Style::default().fg(theme.fg_muted);

    if state.chat.messages.is_empty() && !state.chat.is_streaming() {
        let welcome = "مرحباً! اسأل عن أي شيء في الدرس، أو حدد نصاً بالفأرة لتشرحه لك.";
        for row in wrap_text(welcome, width) {
            lines.push(Line::from(Span::styled(row, muted)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("اضغط p لعرض الأسئلة المقترحة", muted)));
    }

    for message in &state.chat.messages {
        push_message(&mut lines, message, theme, width);
    }

    if state.chat.is_streaming() {
        let pending = Message::assistant(state.chat.pending.clone());
        push_message(&mut lines, &pending, theme, width);
        lines.push(Line::from(Span::styled(
            state.spinner.frame(),
            Style::default().fg(theme.accent_secondary),
        )));
    }

    if let Some(error) = &state.chat.error {
        for row in wrap_text(&format!("⚠ {error}"), width) {
            lines.push(Line::from(Span::styled(row, Style::default().fg(theme.error))));
        }
    }

    lines
}

fn push_message(lines: &mut Vec<Line<'static>>, message: &Message, theme: &Theme, width: usize) {
    let (name, color) = match message.role {
        Role::User => ("أنت", theme.user_message),
        Role::Assistant => ("المساعد", theme.assistant_message),
    };
    lines.push(Line::from(Span::styled(
        format!("{name}:"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));

    if message.role == Role::Assistant {
        lines.extend(render_markdown(&message.content, theme, width));
        lines.push(Line::from(""));
        return;
    }

    let body = Style::default().fg(theme.fg_primary);
    for paragraph in message.content.lines() {
        if paragraph.trim().is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for row in wrap_text(paragraph, width) {
            lines.push(Line::from(Span::styled(row, body)));
        }
    }
    lines.push(Line::from(""));
}

fn draw_input(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme, focused: bool) {
    let badge = state
        .chat_input
        .message_type()
        .and_then(|text| PRESET_PROMPTS.iter().find(|p| p.text == text))
        .map(|p| format!(" {} ", p.label));

    let mut block = Block::default()
        .title(" اكتب سؤالك ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            theme.accent_primary
        } else {
            theme.border
        }));
    if let Some(badge) = badge {
        block = block.title_bottom(Line::from(Span::styled(
            badge,
            Style::default().fg(theme.bg_primary).bg(theme.accent_secondary),
        )));
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    state.hits.chat_input = area;

    let style = Style::default().fg(theme.fg_primary);
    let (text, cursor) =
        input_window(state.chat_input.text(), state.chat_input.cursor(), inner.width as usize);
    let line = if focused {
        build_line_with_cursor(&text, cursor, style, theme)
    } else if state.chat_input.is_empty() {
        Line::from(Span::styled("اضغط i أو Tab للكتابة", Style::default().fg(theme.fg_muted)))
    } else {
        Line::from(Span::styled(text, style))
    };

    frame.render_widget(Paragraph::new(line), inner);
}

/// Part of the input that fits in `width` chars, keeping the cursor in view.
///
/// Returns the visible text and the cursor position inside it.
pub fn input_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    // The cursor block needs a cell even past the last char
    let width = width.max(1);
    if chars.len() < width {
        return (text.to_string(), cursor);
    }
    let start = (cursor + 1).saturating_sub(width);
    let end = (start + width).min(chars.len());
    (chars[start..end].iter().collect(), cursor - start)
}
