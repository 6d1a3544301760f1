//! Session state persistence
//!
//! Remembers the last lesson and tab so the next launch resumes there.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Config;
use crate::app::navigation::NavigationSelection;

/// Narrowest lesson panel, as a percentage of the body width
pub const MIN_LESSON_WIDTH: u16 = 40;
/// Widest lesson panel, as a percentage of the body width
pub const MAX_LESSON_WIDTH: u16 = 80;

/// All session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Last navigation selection, restored once the tree loads
    #[serde(default)]
    pub selection: Option<NavigationSelection>,
    /// Lesson panel width percentage (40-80)
    #[serde(default = "default_lesson_width")]
    pub lesson_width_percent: u16,
}

fn default_lesson_width() -> u16 {
    60
}

impl Session {
    /// Load session from disk
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::session_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read session from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse session.json")
        } else {
            Ok(Self { lesson_width_percent: default_lesson_width(), ..Self::default() })
        }
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::session_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize session")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write session to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the session file
    fn session_path() -> Result<PathBuf> {
        Ok(Config::data_dir()?.join("session.json"))
    }

    /// Lesson panel width clamped to a usable range
    pub fn lesson_width(&self) -> u16 {
        self.lesson_width_percent.clamp(MIN_LESSON_WIDTH, MAX_LESSON_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::navigation::Tab;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_session_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load_from(&dir.path().join("session.json")).unwrap();
        assert!(session.selection.is_none());
        assert_eq!(session.lesson_width(), 60);
    }

    #[test]
    fn session_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("session.json");

        let session = Session {
            selection: Some(NavigationSelection {
                grade_id: Some(1),
                subject_id: Some(10),
                unit_id: Some(100),
                lesson_id: Some(1000),
                tab: Tab::Objectives,
            }),
            lesson_width_percent: 70,
        };
        session.save_to(&path).unwrap();

        assert_eq!(Session::load_from(&path).unwrap(), session);
    }

    #[test]
    fn old_session_without_width_deserializes() {
        let session: Session = serde_json::from_str(r#"{"selection":null}"#).unwrap();
        assert_eq!(session.lesson_width_percent, 60);
    }

    #[test]
    fn width_is_clamped() {
        let session = Session { lesson_width_percent: 5, ..Session::default() };
        assert_eq!(session.lesson_width(), 40);
    }
}
