//! Theming system for dars

mod classroom;
mod daylight;

pub use classroom::CLASSROOM;
pub use daylight::DAYLIGHT;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::app::popup::Tone;

/// A color theme for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Background colors
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_tertiary: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Popup action buttons
    pub action_blue: Color,
    pub action_green: Color,
    pub action_purple: Color,
    pub action_amber: Color,
    pub action_neutral: Color,
    pub action_fg: Color,

    // Chat
    pub user_message: Color,
    pub assistant_message: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
    pub popup_border: Color,
    pub selection: Color,
    pub cursor: Color,
}

impl Theme {
    /// Look up a built-in theme, falling back to Classroom
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "daylight" => Theme::daylight(),
            "classroom" => Theme::classroom(),
            other => {
                tracing::warn!("Unknown theme {:?}, using Classroom", other);
                Theme::classroom()
            }
        }
    }

    /// Background colour of a popup button
    pub fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Blue => self.action_blue,
            Tone::Green => self.action_green,
            Tone::Purple => self.action_purple,
            Tone::Amber => self.action_amber,
            Tone::Neutral => self.action_neutral,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::classroom()
    }
}
