//! Selection highlight and the floating action popup

use std::time::Instant;

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::popup::ActionKind;
use crate::app::state::AppState;
use crate::theme::Theme;

/// Cells covered by a selection running from `start` to `end` in reading order
pub fn highlight_cells(start: Position, end: Position, region: Rect) -> Vec<Rect> {
    let mut rows = Vec::new();
    let bottom = end.y.min(region.bottom().saturating_sub(1));
    for y in start.y.max(region.y)..=bottom {
        let from = if y == start.y { start.x } else { region.x };
        let to = if y == end.y { end.x } else { region.right().saturating_sub(1) };
        if to >= from {
            rows.push(Rect::new(from, y, to - from + 1, 1));
        }
    }
    rows
}

/// Paint the selection background over the lesson text
pub fn draw_highlight(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let Some((start, end)) = state.selection.highlight() else {
        return;
    };
    let region = state.selection.region();
    paint(frame.buffer_mut(), &highlight_cells(start, end, region), theme);
}

fn paint(buffer: &mut Buffer, rows: &[Rect], theme: &Theme) {
    for row in rows {
        for x in row.left()..row.right() {
            if let Some(cell) = buffer.cell_mut(Position { x, y: row.y }) {
                cell.set_bg(theme.selection);
            }
        }
    }
}

/// Draw the popup above the published selection and record its layout
pub fn draw(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let anchor = match state.selection.state().position {
        Some(anchor) if state.selection.is_active() => anchor,
        _ => {
            state.popup.set_layout(None);
            return;
        }
    };

    let now = Instant::now();
    let layout = state.popup.layout(anchor, frame.area(), now);

    frame.render_widget(Clear, layout.area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.popup_border))
            .style(Style::default().bg(theme.bg_secondary)),
        layout.area,
    );

    for (action, button) in state.popup.actions().iter().zip(&layout.buttons) {
        if button.width == 0 {
            continue;
        }
        let copied = action.kind == ActionKind::Copy && state.popup.copied_visible(now);
        let bg = if copied { theme.success } else { theme.tone(action.tone) };
        let label = format!(" {} ", state.popup.label(action, now));
        let style = Style::default().fg(theme.action_fg).bg(bg).add_modifier(Modifier::BOLD);
        frame.render_widget(Paragraph::new(Span::styled(label, style)), *button);
    }

    state.popup.set_layout(Some(layout));
}
