//! Key mapping for the lesson panel

use crossterm::event::{KeyCode, KeyModifiers};

use super::navigation::Level;

/// Vim-style key mapping (basic, without modifiers)
pub fn vim_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevLesson),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::NextLesson),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::Char('d') | KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Char('u') | KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('?') => Some(Action::Help),
        KeyCode::Char(':') => Some(Action::Command),
        // Note: 'q' intentionally not mapped - use :q command to quit
        KeyCode::Char('[') => Some(Action::PrevTab),
        KeyCode::Char(']') => Some(Action::NextTab),
        KeyCode::Char('1') => Some(Action::OpenDropdown(Level::Grade)),
        KeyCode::Char('2') => Some(Action::OpenDropdown(Level::Subject)),
        KeyCode::Char('3') => Some(Action::OpenDropdown(Level::Unit)),
        KeyCode::Char('4') => Some(Action::OpenDropdown(Level::Lesson)),
        KeyCode::Char('p') => Some(Action::Presets),
        KeyCode::Char('i') | KeyCode::Tab => Some(Action::FocusChat),
        KeyCode::Char('D') => Some(Action::DownloadTextbook),
        KeyCode::Char('<') => Some(Action::NarrowLesson),
        KeyCode::Char('>') => Some(Action::WidenLesson),
        _ => None,
    }
}

/// Key mapping with modifiers (for Ctrl combinations)
pub fn key_with_modifier_to_action(key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match key {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('d') => Some(Action::HalfPageDown),
            KeyCode::Char('u') => Some(Action::HalfPageUp),
            KeyCode::Char('f') => Some(Action::PageDown),
            KeyCode::Char('b') => Some(Action::PageUp),
            _ => None,
        }
    } else {
        vim_key_to_action(key)
    }
}

/// Actions that can be taken in the lesson panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Scrolling
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,

    // Selection
    Select,
    Back,

    // Navigation
    PrevLesson,
    NextLesson,
    PrevTab,
    NextTab,
    OpenDropdown(Level),

    // Chat
    Presets,
    FocusChat,

    // Layout
    NarrowLesson,
    WidenLesson,

    DownloadTextbook,
    Command,
    Help,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_brackets_resize_lesson() {
        assert_eq!(vim_key_to_action(KeyCode::Char('<')), Some(Action::NarrowLesson));
        assert_eq!(vim_key_to_action(KeyCode::Char('>')), Some(Action::WidenLesson));
    }

    #[test]
    fn vim_j_maps_to_down() {
        assert_eq!(vim_key_to_action(KeyCode::Char('j')), Some(Action::Down));
    }

    #[test]
    fn vim_k_maps_to_up() {
        assert_eq!(vim_key_to_action(KeyCode::Char('k')), Some(Action::Up));
    }

    #[test]
    fn unknown_key_returns_none() {
        assert_eq!(vim_key_to_action(KeyCode::Char('x')), None);
    }

    #[test]
    fn brackets_switch_tabs() {
        assert_eq!(vim_key_to_action(KeyCode::Char('[')), Some(Action::PrevTab));
        assert_eq!(vim_key_to_action(KeyCode::Char(']')), Some(Action::NextTab));
    }

    #[test]
    fn digits_open_level_dropdowns() {
        assert_eq!(vim_key_to_action(KeyCode::Char('1')), Some(Action::OpenDropdown(Level::Grade)));
        assert_eq!(vim_key_to_action(KeyCode::Char('4')), Some(Action::OpenDropdown(Level::Lesson)));
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
    }

    #[test]
    fn ctrl_d_half_page_down() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('d'), KeyModifiers::CONTROL),
            Some(Action::HalfPageDown)
        );
    }

    #[test]
    fn no_modifier_uses_vim_keys() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('j'), KeyModifiers::NONE),
            Some(Action::Down)
        );
    }
}
