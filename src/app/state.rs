//! Application state definitions

use std::path::PathBuf;
use std::time::Instant;

use ratatui::layout::{Position, Rect};

use super::bridge::ChatInputBridge;
use super::chat::{ChatInput, ChatState};
use super::edit::EditBuffer;
use super::navigation::{Level, NavigationSelection, NavigationState, Tab};
use super::popup::SelectionPopup;
use super::selection::SelectionController;
use crate::config::Config;
use crate::curriculum::{NodeId, PdfDocument};

/// Which panel receives key presses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Lesson,
    Chat,
}

/// Progress of the navigation tree fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Loading,
    Ready,
    /// Fetch failed; holds the message shown to the student
    Failed(String),
}

/// An open level picker in the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropdownState {
    pub level: Level,
    pub highlighted: usize,
}

/// Floating panel drawn over the main screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Help,
    Presets {
        highlighted: usize,
    },
    Dropdown(DropdownState),
}

/// Textbook state for the current subject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PdfState {
    #[default]
    Idle,
    Loading(NodeId),
    Ready(PdfDocument),
    /// The subject has no textbook
    Missing(NodeId),
    Failed {
        subject_id: NodeId,
        message: String,
    },
    Downloading(PdfDocument),
    Downloaded {
        doc: PdfDocument,
        path: PathBuf,
        bytes: u64,
    },
}

impl PdfState {
    /// Subject this state belongs to
    pub fn subject_id(&self) -> Option<NodeId> {
        match self {
            PdfState::Idle => None,
            PdfState::Loading(id) | PdfState::Missing(id) => Some(*id),
            PdfState::Failed { subject_id, .. } => Some(*subject_id),
            PdfState::Ready(doc) | PdfState::Downloading(doc) | PdfState::Downloaded { doc, .. } => {
                Some(doc.subject_id)
            }
        }
    }

    pub fn document(&self) -> Option<&PdfDocument> {
        match self {
            PdfState::Ready(doc) | PdfState::Downloading(doc) | PdfState::Downloaded { doc, .. } => {
                Some(doc)
            }
            _ => None,
        }
    }
}

/// Scroll state of the lesson panel
#[derive(Debug, Clone, Default)]
pub struct LessonView {
    /// Current scroll position (lines from top)
    pub scroll_offset: usize,
    /// Total rendered lines (updated on render)
    pub total_lines: usize,
    /// Visible height in lines (updated on render)
    pub visible_height: usize,
    /// Highlighted practice question on the questions tab
    pub question_index: usize,
}

impl LessonView {
    /// Get the maximum allowed scroll offset
    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height)
    }

    /// Clamp scroll offset to valid range
    pub fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.scroll_offset > max {
            self.scroll_offset = max;
        }
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
        self.question_index = 0;
    }
}

/// Screen areas recorded during the last draw, for mouse hit testing
#[derive(Debug, Clone, Default)]
pub struct HitRegions {
    pub nav: Vec<(Level, Rect)>,
    pub tabs: Vec<(Tab, Rect)>,
    /// Dropdown rows, by option index
    pub dropdown: Vec<(usize, Rect)>,
    /// Preset menu rows, by preset index
    pub presets: Vec<(usize, Rect)>,
    /// Practice question rows, by question index
    pub questions: Vec<(usize, Rect)>,
    pub lesson: Rect,
    pub chat: Rect,
    pub chat_input: Rect,
}

impl HitRegions {
    /// Whether `pos` is on something that reacts to clicks
    pub fn is_clickable(&self, pos: Position) -> bool {
        self.nav.iter().any(|(_, r)| r.contains(pos))
            || self.tabs.iter().any(|(_, r)| r.contains(pos))
            || self.dropdown.iter().any(|(_, r)| r.contains(pos))
            || self.presets.iter().any(|(_, r)| r.contains(pos))
            || self.questions.iter().any(|(_, r)| r.contains(pos))
            || self.chat_input.contains(pos)
    }

    /// Forget overlay hit areas (the overlay was closed)
    pub fn clear_overlays(&mut self) {
        self.dropdown.clear();
        self.presets.clear();
    }
}

/// Loading indicator frames
#[derive(Debug, Clone)]
pub struct Spinner {
    /// When the spinner started
    pub start_time: Instant,
    pub current_frame: usize,
}

impl Default for Spinner {
    fn default() -> Self {
        Self { start_time: Instant::now(), current_frame: 0 }
    }
}

impl Spinner {
    pub const MS_PER_FRAME: u128 = 80;
    const FRAMES: [&'static str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

    /// Advance based on elapsed time
    pub fn tick(&mut self) {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        self.current_frame = (elapsed_ms / Self::MS_PER_FRAME) as usize;
    }

    pub fn frame(&self) -> &'static str {
        Self::FRAMES[self.current_frame % Self::FRAMES.len()]
    }
}

/// Command line mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandMode {
    /// Command line hidden or showing status
    #[default]
    Normal,
    /// Accepting : commands
    Command,
}

/// State for the command line input
#[derive(Debug, Clone, Default)]
pub struct CommandLineState {
    pub mode: CommandMode,
    pub input: EditBuffer,
    /// Status/error message to display (when not in input mode)
    pub message: Option<String>,
    pub is_error: bool,
    pub history: Vec<String>,
    /// Current history index when navigating
    pub history_index: Option<usize>,
}

impl CommandLineState {
    /// Maximum number of history entries to keep
    const MAX_HISTORY: usize = 200;

    pub fn enter_command_mode(&mut self) {
        self.mode = CommandMode::Command;
        self.input.clear();
        self.message = None;
        self.history_index = None;
    }

    pub fn exit_input_mode(&mut self) {
        self.mode = CommandMode::Normal;
        self.input.clear();
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn is_input_mode(&self) -> bool {
        self.mode == CommandMode::Command
    }

    pub fn add_to_history(&mut self, cmd: String) {
        if !cmd.is_empty() && self.history.last() != Some(&cmd) {
            if self.history.len() >= Self::MAX_HISTORY {
                self.history.remove(0);
            }
            self.history.push(cmd);
        }
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            None => self.history.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.history_index = Some(index);
        self.input.set(self.history[index].clone());
    }

    pub fn history_down(&mut self) {
        let Some(i) = self.history_index else { return };
        if i + 1 < self.history.len() {
            self.history_index = Some(i + 1);
            self.input.set(self.history[i + 1].clone());
        } else {
            self.history_index = None;
            self.input.clear();
        }
    }
}

/// Full application state
#[derive(Debug)]
pub struct AppState {
    pub focus: Focus,
    pub overlay: Overlay,

    /// Navigation tree fetch status
    pub nav_status: LoadStatus,
    pub navigation: NavigationState,
    /// Saved selection to re-apply once the tree arrives
    pub pending_restore: Option<NavigationSelection>,

    pub pdf: PdfState,
    pub lesson_view: LessonView,

    pub selection: SelectionController,
    pub popup: SelectionPopup,
    pub bridge: ChatInputBridge,
    pub chat_input: ChatInput,
    pub chat: ChatState,

    pub command_line: CommandLineState,
    pub hits: HitRegions,
    pub spinner: Spinner,

    /// Lesson panel share of the body width
    pub lesson_width_percent: u16,
}

impl AppState {
    /// Build state from configuration, with the chat input mounted on the bridge
    pub fn new(config: &Config) -> Self {
        let mut bridge = ChatInputBridge::new();
        let mut chat_input = ChatInput::default();
        chat_input.mount(&mut bridge);

        Self {
            focus: Focus::default(),
            overlay: Overlay::default(),
            nav_status: LoadStatus::default(),
            navigation: NavigationState::default(),
            pending_restore: None,
            pdf: PdfState::default(),
            lesson_view: LessonView::default(),
            selection: SelectionController::new(config.anchor_offset),
            popup: SelectionPopup::new(config.copied_duration()),
            bridge,
            chat_input,
            chat: ChatState::default(),
            command_line: CommandLineState::default(),
            hits: HitRegions::default(),
            spinner: Spinner::default(),
            lesson_width_percent: 60,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
