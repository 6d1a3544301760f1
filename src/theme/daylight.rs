//! Daylight theme for bright terminals

use ratatui::style::Color;

use super::Theme;

pub const DAYLIGHT: Theme = Theme {
    name: String::new(), // Filled in by Theme::daylight()

    bg_primary: Color::Rgb(255, 255, 255),   // #ffffff
    bg_secondary: Color::Rgb(241, 245, 249), // #f1f5f9
    bg_tertiary: Color::Rgb(226, 232, 240),  // #e2e8f0

    fg_primary: Color::Rgb(51, 65, 85),    // #334155
    fg_secondary: Color::Rgb(15, 23, 42),  // #0f172a
    fg_muted: Color::Rgb(148, 163, 184),   // #94a3b8

    accent_primary: Color::Rgb(30, 58, 138),    // #1e3a8a
    accent_secondary: Color::Rgb(124, 58, 237), // #7c3aed

    success: Color::Rgb(5, 150, 105),  // #059669
    warning: Color::Rgb(217, 119, 6),  // #d97706
    error: Color::Rgb(220, 38, 38),    // #dc2626
    info: Color::Rgb(37, 99, 235),     // #2563eb

    action_blue: Color::Rgb(59, 130, 246),    // #3b82f6
    action_green: Color::Rgb(16, 185, 129),   // #10b981
    action_purple: Color::Rgb(139, 92, 246),  // #8b5cf6
    action_amber: Color::Rgb(245, 158, 11),   // #f59e0b
    action_neutral: Color::Rgb(107, 114, 128), // #6b7280
    action_fg: Color::Rgb(255, 255, 255),

    user_message: Color::Rgb(30, 58, 138),     // #1e3a8a
    assistant_message: Color::Rgb(51, 65, 85), // #334155

    border: Color::Rgb(203, 213, 225),        // #cbd5e1
    border_focused: Color::Rgb(59, 130, 246), // #3b82f6
    popup_border: Color::Rgb(216, 180, 254),  // #d8b4fe
    selection: Color::Rgb(219, 234, 254),     // #dbeafe
    cursor: Color::Rgb(15, 23, 42),           // #0f172a
};

impl Theme {
    pub fn daylight() -> Self {
        Theme { name: "Daylight".to_string(), ..DAYLIGHT }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daylight_has_correct_name() {
        assert_eq!(Theme::daylight().name, "Daylight");
    }
}
