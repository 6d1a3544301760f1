//! UI rendering components

pub mod chat_panel;
pub mod command_line;
pub mod layout;
pub mod lesson;
pub mod main_screen;
pub mod markdown;
pub mod nav_bar;
pub mod overlay;
pub mod popup;

use ratatui::Frame;

use crate::app::state::AppState;
use crate::theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    main_screen::draw(frame, state, theme);
}
