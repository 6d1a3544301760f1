//! Main screen: navigation bar, lesson and chat side by side, command line

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use super::{chat_panel, command_line, lesson, nav_bar, overlay, popup};
use crate::app::state::{AppState, Focus, HitRegions, Overlay};
use crate::theme::Theme;

/// Height of the navigation bar including borders
const NAV_HEIGHT: u16 = 3;

/// Minimum width for either body panel
const PANEL_MIN_WIDTH: u16 = 24;

/// Draw the main screen
pub fn draw(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let area = frame.area();

    // Hit regions are rebuilt from scratch every frame
    state.hits = HitRegions::default();

    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(NAV_HEIGHT), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let nav_area = vertical_chunks[0];
    let body_area = vertical_chunks[1];
    let command_area = vertical_chunks[2];

    let [lesson_area, chat_area] = create_layout(body_area, state.lesson_width_percent);

    let focus = state.focus;
    nav_bar::draw(frame, nav_area, state, theme);
    lesson::draw(frame, lesson_area, state, theme, focus == Focus::Lesson);
    popup::draw_highlight(frame, state, theme);
    chat_panel::draw(frame, chat_area, state, theme, focus == Focus::Chat);
    command_line::draw(frame, command_area, &state.command_line, state.mode_label(), theme);

    if state.overlay == Overlay::None {
        popup::draw(frame, state, theme);
    } else {
        state.popup.set_layout(None);
        overlay::draw(frame, state, theme);
    }
}

/// Split the body between the lesson (left) and chat (right) panels
pub fn create_layout(area: Rect, lesson_width_percent: u16) -> [Rect; 2] {
    let lesson_width = (area.width as u32 * lesson_width_percent as u32 / 100) as u16;
    let lesson_width = if area.width >= PANEL_MIN_WIDTH * 2 {
        lesson_width.clamp(PANEL_MIN_WIDTH, area.width - PANEL_MIN_WIDTH)
    } else {
        lesson_width
    };

    Layout::horizontal([Constraint::Length(lesson_width), Constraint::Min(0)]).areas(area)
}
