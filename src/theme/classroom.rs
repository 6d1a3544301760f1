//! Classroom theme: navy board with the school's accent palette

use ratatui::style::Color;

use super::Theme;

/// Classroom color palette
pub const CLASSROOM: Theme = Theme {
    name: String::new(), // Filled in by Theme::classroom()

    // Background colors
    bg_primary: Color::Rgb(15, 23, 42),   // #0f172a
    bg_secondary: Color::Rgb(30, 41, 59), // #1e293b
    bg_tertiary: Color::Rgb(51, 65, 85),  // #334155

    // Foreground colors
    fg_primary: Color::Rgb(226, 232, 240),   // #e2e8f0
    fg_secondary: Color::Rgb(248, 250, 252), // #f8fafc
    fg_muted: Color::Rgb(100, 116, 139),     // #64748b

    // Accent colors
    accent_primary: Color::Rgb(59, 130, 246),    // #3b82f6
    accent_secondary: Color::Rgb(216, 180, 254), // #d8b4fe

    // Semantic colors
    success: Color::Rgb(16, 185, 129), // #10b981
    warning: Color::Rgb(245, 158, 11), // #f59e0b
    error: Color::Rgb(239, 68, 68),    // #ef4444
    info: Color::Rgb(96, 165, 250),    // #60a5fa

    // Popup action buttons
    action_blue: Color::Rgb(59, 130, 246),   // #3b82f6
    action_green: Color::Rgb(16, 185, 129),  // #10b981
    action_purple: Color::Rgb(139, 92, 246), // #8b5cf6
    action_amber: Color::Rgb(245, 158, 11),  // #f59e0b
    action_neutral: Color::Rgb(71, 85, 105), // #475569
    action_fg: Color::Rgb(255, 255, 255),

    // Chat
    user_message: Color::Rgb(147, 197, 253),      // #93c5fd
    assistant_message: Color::Rgb(226, 232, 240), // #e2e8f0

    // UI elements
    border: Color::Rgb(51, 65, 85),            // #334155
    border_focused: Color::Rgb(30, 58, 138),   // #1e3a8a
    popup_border: Color::Rgb(216, 180, 254),   // #d8b4fe
    selection: Color::Rgb(30, 58, 138),        // #1e3a8a
    cursor: Color::Rgb(248, 250, 252),         // #f8fafc
};

impl Theme {
    pub fn classroom() -> Self {
        Theme { name: "Classroom".to_string(), ..CLASSROOM }
    }
}
