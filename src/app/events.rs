//! Input dispatch
//!
//! Handlers mutate [`AppState`] and return [`Effect`]s for the runtime to
//! execute, so everything here runs without a terminal or network.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use super::chat::{OutgoingChat, PRESET_PROMPTS, practice_prompts};
use super::command::{Command, ParseResult, parse_command};
use super::input::{Action, key_with_modifier_to_action};
use super::navigation::{Level, NavigationState, Tab};
use super::popup::PopupOutcome;
use super::selection::PressTarget;
use super::state::{AppState, CommandMode, DropdownState, Focus, LoadStatus, Overlay, PdfState};
use crate::api::{ApiError, StreamEvent};
use crate::config::session::{MAX_LESSON_WIDTH, MIN_LESSON_WIDTH};
use crate::curriculum::{Grade, NodeId, PdfDocument};

/// Lines moved per mouse wheel notch
const WHEEL_LINES: isize = 3;

/// Percentage points the lesson panel grows or shrinks per key press
const LESSON_WIDTH_STEP: i16 = 5;

/// Side effects requested by a handler
#[derive(Debug)]
pub enum Effect {
    Quit,
    FetchNavigation,
    FetchPdf(NodeId),
    DownloadPdf(PdfDocument),
    SendChat(OutgoingChat),
    Copy(String),
}

/// Results delivered by background tasks
#[derive(Debug)]
pub enum AppEvent {
    NavigationLoaded(Result<Vec<Grade>, ApiError>),
    PdfLoaded { subject_id: NodeId, result: Result<PdfDocument, ApiError> },
    PdfDownloaded { doc: PdfDocument, result: Result<(PathBuf, u64), ApiError> },
    /// Stream events carry the sequence number of their request
    Chat { seq: u64, event: StreamEvent },
    ChatFinished { seq: u64, result: Result<(), ApiError> },
}

impl AppState {
    /// Periodic update: animation and bridge delivery
    pub fn tick(&mut self) {
        self.spinner.tick();
        self.chat_input.sync();
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Effect::Quit];
        }

        if self.command_line.is_input_mode() {
            return self.handle_command_key(key);
        }

        match self.overlay {
            Overlay::Help => {
                self.overlay = Overlay::None;
                return Vec::new();
            }
            Overlay::Presets { highlighted } => return self.handle_presets_key(key, highlighted),
            Overlay::Dropdown(dropdown) => return self.handle_dropdown_key(key, dropdown),
            Overlay::None => {}
        }

        if self.focus == Focus::Chat {
            return self.handle_chat_key(key);
        }

        if self.selection.is_active() {
            match key.code {
                KeyCode::Esc => {
                    self.selection.clear();
                    return Vec::new();
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let index = (c as usize) - ('1' as usize);
                    if index < self.popup.actions().len() {
                        return self.trigger_popup(index);
                    }
                }
                _ => {}
            }
        }

        match key_with_modifier_to_action(key.code, key.modifiers) {
            Some(action) => self.handle_action(action),
            None => Vec::new(),
        }
    }

    fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        let page = self.lesson_view.visible_height.max(1) as isize;
        let on_questions = self.navigation.tab() == Tab::Questions;
        let scroll_before = self.lesson_view.scroll_offset;

        match action {
            Action::Up if on_questions => self.move_question(-1),
            Action::Down if on_questions => self.move_question(1),
            Action::Up => self.lesson_view.scroll_by(-1),
            Action::Down => self.lesson_view.scroll_by(1),
            Action::Top => self.lesson_view.scroll_offset = 0,
            Action::Bottom => self.lesson_view.scroll_offset = self.lesson_view.max_scroll(),
            Action::PageUp => self.lesson_view.scroll_by(-page),
            Action::PageDown => self.lesson_view.scroll_by(page),
            Action::HalfPageUp => self.lesson_view.scroll_by(-page / 2),
            Action::HalfPageDown => self.lesson_view.scroll_by(page / 2),
            Action::Select => return self.activate_current(),
            Action::Back => self.command_line.clear_message(),
            Action::PrevLesson => return self.step(Level::Lesson, -1),
            Action::NextLesson => return self.step(Level::Lesson, 1),
            Action::PrevTab => return self.switch_tab(self.navigation.tab().offset(-1)),
            Action::NextTab => return self.switch_tab(self.navigation.tab().offset(1)),
            Action::OpenDropdown(level) => self.open_dropdown(level),
            Action::Presets => self.overlay = Overlay::Presets { highlighted: 0 },
            Action::FocusChat => self.focus = Focus::Chat,
            Action::NarrowLesson => self.resize_lesson(-LESSON_WIDTH_STEP),
            Action::WidenLesson => self.resize_lesson(LESSON_WIDTH_STEP),
            Action::DownloadTextbook => return self.download_textbook(),
            Action::Command => self.command_line.enter_command_mode(),
            Action::Help => self.overlay = Overlay::Help,
            Action::Quit => return vec![Effect::Quit],
        }
        if self.lesson_view.scroll_offset != scroll_before {
            self.lesson_scrolled();
        }
        Vec::new()
    }

    fn handle_command_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Enter {
            return self.run_command_line();
        }

        let cl = &mut self.command_line;
        match key.code {
            KeyCode::Esc => cl.exit_input_mode(),
            KeyCode::Backspace if cl.input.is_empty() => cl.exit_input_mode(),
            KeyCode::Backspace => cl.input.delete_char(),
            KeyCode::Delete => cl.input.delete_char_forward(),
            KeyCode::Left => cl.input.move_left(),
            KeyCode::Right => cl.input.move_right(),
            KeyCode::Home => cl.input.move_start(),
            KeyCode::End => cl.input.move_end(),
            KeyCode::Up => cl.history_up(),
            KeyCode::Down => cl.history_down(),
            KeyCode::Char(c) => cl.input.insert_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn run_command_line(&mut self) -> Vec<Effect> {
        let text = self.command_line.input.take();
        self.command_line.add_to_history(text.clone());
        self.command_line.exit_input_mode();

        match parse_command(&text) {
            ParseResult::Ok(command) => return self.execute_command(command),
            ParseResult::UnknownCommand(cmd) => {
                self.command_line.set_error(format!("Unknown command: {cmd}"));
            }
            ParseResult::MissingArgument(cmd) => {
                self.command_line.set_error(format!("{cmd} needs an argument"));
            }
            ParseResult::InvalidArgument { command, argument } => {
                self.command_line.set_error(format!("Invalid argument for {command}: {argument}"));
            }
        }
        Vec::new()
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Lesson,
            KeyCode::Enter => return self.submit_chat(),
            KeyCode::Char('x') if ctrl => self.chat.cancel(),
            KeyCode::Char('p') if ctrl => self.overlay = Overlay::Presets { highlighted: 0 },
            KeyCode::Backspace => self.chat_input.delete_char(),
            KeyCode::Delete => self.chat_input.delete_char_forward(),
            KeyCode::Left => self.chat_input.move_left(),
            KeyCode::Right => self.chat_input.move_right(),
            KeyCode::Home => self.chat_input.move_start(),
            KeyCode::End => self.chat_input.move_end(),
            KeyCode::Up | KeyCode::PageUp => self.chat.scroll = self.chat.scroll.saturating_add(1),
            KeyCode::Down | KeyCode::PageDown => self.chat.scroll = self.chat.scroll.saturating_sub(1),
            KeyCode::Char(c) if !ctrl => self.chat_input.insert_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_presets_key(&mut self, key: KeyEvent, highlighted: usize) -> Vec<Effect> {
        let last = PRESET_PROMPTS.len().saturating_sub(1);
        match key.code {
            KeyCode::Esc | KeyCode::Char('p') => self.overlay = Overlay::None,
            KeyCode::Char('j') | KeyCode::Down => {
                self.overlay = Overlay::Presets { highlighted: (highlighted + 1).min(last) }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.overlay = Overlay::Presets { highlighted: highlighted.saturating_sub(1) }
            }
            KeyCode::Enter => self.apply_preset(highlighted),
            KeyCode::Char(c @ '1'..='9') => self.apply_preset((c as usize) - ('1' as usize)),
            _ => {}
        }
        Vec::new()
    }

    fn handle_dropdown_key(&mut self, key: KeyEvent, dropdown: DropdownState) -> Vec<Effect> {
        let count = self.navigation.options(dropdown.level).len();
        match key.code {
            KeyCode::Esc => self.close_overlay(),
            KeyCode::Char('j') | KeyCode::Down => {
                let highlighted = (dropdown.highlighted + 1).min(count.saturating_sub(1));
                self.overlay = Overlay::Dropdown(DropdownState { highlighted, ..dropdown });
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let highlighted = dropdown.highlighted.saturating_sub(1);
                self.overlay = Overlay::Dropdown(DropdownState { highlighted, ..dropdown });
            }
            KeyCode::Enter => return self.choose_dropdown(dropdown.level, dropdown.highlighted),
            _ => {}
        }
        Vec::new()
    }

    /// Handle a mouse event
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Effect> {
        let pos = Position { x: mouse.column, y: mouse.row };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => return self.on_press(pos),
            MouseEventKind::Drag(MouseButton::Left) => self.selection.drag_to(pos),
            MouseEventKind::Up(MouseButton::Left) => {
                self.selection.release(pos);
            }
            MouseEventKind::ScrollDown => self.scroll_at(pos, WHEEL_LINES),
            MouseEventKind::ScrollUp => self.scroll_at(pos, -WHEEL_LINES),
            _ => {}
        }
        Vec::new()
    }

    fn on_press(&mut self, pos: Position) -> Vec<Effect> {
        let target = if self.selection.is_active() && self.popup.contains(pos) {
            PressTarget::Popup
        } else if self.hits.is_clickable(pos) {
            PressTarget::Clickable
        } else if self.overlay == Overlay::None && self.selection.region().contains(pos) {
            PressTarget::Content
        } else {
            PressTarget::Elsewhere
        };

        self.selection.press(pos, target);

        match target {
            PressTarget::Popup => match self.popup.action_at(pos) {
                Some(index) => self.trigger_popup(index),
                None => Vec::new(),
            },
            PressTarget::Clickable => self.click(pos),
            PressTarget::Content => {
                self.focus = Focus::Lesson;
                Vec::new()
            }
            PressTarget::Elsewhere => {
                if self.overlay != Overlay::None {
                    self.close_overlay();
                } else if self.hits.chat.contains(pos) {
                    self.focus = Focus::Chat;
                }
                Vec::new()
            }
        }
    }

    /// Click on a recorded hit region
    fn click(&mut self, pos: Position) -> Vec<Effect> {
        if let Some(&(index, _)) = self.hits.dropdown.iter().find(|(_, r)| r.contains(pos)) {
            if let Overlay::Dropdown(dropdown) = self.overlay {
                return self.choose_dropdown(dropdown.level, index);
            }
        }
        if let Some(&(index, _)) = self.hits.presets.iter().find(|(_, r)| r.contains(pos)) {
            self.apply_preset(index);
            return Vec::new();
        }

        // Anything below is on the main screen, so an open overlay closes first
        if self.overlay != Overlay::None {
            self.close_overlay();
        }

        if let Some(&(level, _)) = self.hits.nav.iter().find(|(_, r)| r.contains(pos)) {
            self.open_dropdown(level);
        } else if let Some(&(tab, _)) = self.hits.tabs.iter().find(|(_, r)| r.contains(pos)) {
            return self.switch_tab(tab);
        } else if let Some(&(index, _)) = self.hits.questions.iter().find(|(_, r)| r.contains(pos)) {
            self.lesson_view.question_index = index;
            self.ask_question(index);
        } else if self.hits.chat_input.contains(pos) {
            self.focus = Focus::Chat;
        }
        Vec::new()
    }

    fn scroll_at(&mut self, pos: Position, delta: isize) {
        if self.hits.chat.contains(pos) {
            // Chat scroll counts lines up from the bottom
            self.chat.scroll = self.chat.scroll.saturating_add_signed(-delta);
        } else if self.hits.lesson.contains(pos) {
            let before = self.lesson_view.scroll_offset;
            self.lesson_view.scroll_by(delta);
            if self.lesson_view.scroll_offset != before {
                self.lesson_scrolled();
            }
        }
    }

    fn resize_lesson(&mut self, delta: i16) {
        let width = self
            .lesson_width_percent
            .saturating_add_signed(delta)
            .clamp(MIN_LESSON_WIDTH, MAX_LESSON_WIDTH);
        if width != self.lesson_width_percent {
            self.lesson_width_percent = width;
            // Text reflows under the old selection cells
            self.selection.clear();
        }
    }

    /// Selected cells no longer cover the selected text once the lesson moves
    fn lesson_scrolled(&mut self) {
        if self.selection.is_active() {
            tracing::debug!("Lesson scrolled, clearing selection");
            self.selection.clear();
        }
    }

    fn trigger_popup(&mut self, index: usize) -> Vec<Effect> {
        match self.popup.trigger(index, &mut self.selection, &self.bridge) {
            PopupOutcome::Inserted => {
                self.chat_input.sync();
                self.focus = Focus::Chat;
                Vec::new()
            }
            PopupOutcome::Copy(text) => vec![Effect::Copy(text)],
            PopupOutcome::Dismissed | PopupOutcome::Nothing => Vec::new(),
        }
    }

    fn apply_preset(&mut self, index: usize) {
        let Some(preset) = PRESET_PROMPTS.get(index) else {
            return;
        };
        self.chat_input.apply_preset(preset);
        self.close_overlay();
        self.focus = Focus::Chat;
    }

    fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
        self.hits.clear_overlays();
    }

    fn open_dropdown(&mut self, level: Level) {
        if self.nav_status != LoadStatus::Ready {
            return;
        }
        let current = self.navigation.selection().id(level);
        let highlighted =
            self.navigation.options(level).iter().position(|o| Some(o.id) == current).unwrap_or(0);
        self.overlay = Overlay::Dropdown(DropdownState { level, highlighted });
    }

    fn choose_dropdown(&mut self, level: Level, index: usize) -> Vec<Effect> {
        self.close_overlay();
        let id = self.navigation.options(level).get(index).map(|o| o.id);
        match id {
            Some(id) => self.select(level, id),
            None => Vec::new(),
        }
    }

    fn select(&mut self, level: Level, id: NodeId) -> Vec<Effect> {
        match self.navigation.select(level, id) {
            Ok(()) => self.after_navigation(),
            Err(e) => {
                self.command_line.set_error(e.to_string());
                Vec::new()
            }
        }
    }

    fn step(&mut self, level: Level, delta: isize) -> Vec<Effect> {
        if self.navigation.step(level, delta).is_err() {
            return Vec::new();
        }
        self.after_navigation()
    }

    fn switch_tab(&mut self, tab: Tab) -> Vec<Effect> {
        self.navigation.select_tab(tab);
        if self.navigation.tab() != tab {
            self.command_line.set_message("لا يوجد محتوى لهذا الدرس");
        }
        self.lesson_view.reset();
        self.selection.clear();
        self.pdf_effect().into_iter().collect()
    }

    /// Reset per-lesson view state after the selection moved
    fn after_navigation(&mut self) -> Vec<Effect> {
        self.lesson_view.reset();
        self.selection.clear();
        self.pdf_effect().into_iter().collect()
    }

    /// Fetch the textbook when it is shown and not yet known for this subject
    fn pdf_effect(&mut self) -> Option<Effect> {
        if self.navigation.tab() != Tab::Textbook {
            return None;
        }
        let subject_id = self.navigation.selection().subject_id?;
        if self.pdf.subject_id() == Some(subject_id) {
            return None;
        }
        self.pdf = PdfState::Loading(subject_id);
        Some(Effect::FetchPdf(subject_id))
    }

    fn move_question(&mut self, delta: isize) {
        let count = self.navigation.current_lesson().map(|l| practice_prompts(l).len()).unwrap_or(0);
        if count == 0 {
            return;
        }
        let index = self.lesson_view.question_index.saturating_add_signed(delta);
        self.lesson_view.question_index = index.min(count - 1);
    }

    /// Put a practice question into the chat input
    fn ask_question(&mut self, index: usize) {
        let Some(prompt) =
            self.navigation.current_lesson().and_then(|l| practice_prompts(l).into_iter().nth(index))
        else {
            return;
        };
        self.bridge.insert(prompt, false);
        self.chat_input.sync();
        self.focus = Focus::Chat;
    }

    fn activate_current(&mut self) -> Vec<Effect> {
        match self.navigation.tab() {
            Tab::Questions => {
                self.ask_question(self.lesson_view.question_index);
                Vec::new()
            }
            Tab::Textbook => self.download_textbook(),
            Tab::Content | Tab::Objectives => Vec::new(),
        }
    }

    fn download_textbook(&mut self) -> Vec<Effect> {
        match &self.pdf {
            PdfState::Ready(doc) | PdfState::Downloaded { doc, .. } => {
                let doc = doc.clone();
                self.command_line.set_message(format!("جاري تنزيل {}…", doc.title));
                self.pdf = PdfState::Downloading(doc.clone());
                vec![Effect::DownloadPdf(doc)]
            }
            PdfState::Downloading(_) => Vec::new(),
            _ => {
                // Nothing fetched yet: show the tab, which triggers the fetch
                let effects = self.switch_tab(Tab::Textbook);
                if effects.is_empty() {
                    self.command_line.set_error("لا يوجد كتاب لهذه المادة");
                }
                effects
            }
        }
    }

    fn submit_chat(&mut self) -> Vec<Effect> {
        if self.chat.is_streaming() || self.chat_input.is_empty() {
            return Vec::new();
        }
        let text = self.chat_input.take();
        self.send_text(text)
    }

    fn send_text(&mut self, text: String) -> Vec<Effect> {
        match self.chat.begin(text) {
            Some(outgoing) => vec![Effect::SendChat(outgoing)],
            None => Vec::new(),
        }
    }

    fn execute_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::Quit => return vec![Effect::Quit],
            Command::Help => self.overlay = Overlay::Help,
            Command::Select(level, id) => return self.select(level, id),
            Command::Tab(tab) => return self.switch_tab(tab),
            Command::Pdf => return self.download_textbook(),
            Command::Reload => return self.reload(),
            Command::Ask(text) => {
                if self.chat.is_streaming() {
                    self.command_line.set_error("انتظر حتى يكتمل الرد");
                    return Vec::new();
                }
                self.focus = Focus::Chat;
                return self.send_text(text);
            }
            Command::Preset(index) => {
                if index >= PRESET_PROMPTS.len() {
                    self.command_line.set_error(format!("No preset {}", index + 1));
                } else {
                    self.apply_preset(index);
                }
            }
            Command::Clear => {
                self.chat.clear();
                self.command_line.set_message("محادثة جديدة");
            }
            Command::Nop => self.command_line.clear_message(),
        }
        Vec::new()
    }

    /// Fetch the tree again, keeping the current place
    pub fn reload(&mut self) -> Vec<Effect> {
        if self.nav_status == LoadStatus::Ready {
            self.pending_restore = Some(self.navigation.selection());
        }
        self.nav_status = LoadStatus::Loading;
        self.pdf = PdfState::Idle;
        vec![Effect::FetchNavigation]
    }

    /// Apply a background task result
    pub fn handle_app_event(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::NavigationLoaded(Ok(tree)) => {
                self.navigation = NavigationState::load(tree);
                if let Some(saved) = self.pending_restore.take() {
                    self.navigation.restore(saved);
                }
                self.nav_status = LoadStatus::Ready;
                return self.after_navigation();
            }
            AppEvent::NavigationLoaded(Err(e)) => {
                tracing::error!("Failed to load navigation: {}", e);
                self.nav_status = LoadStatus::Failed(e.user_message());
            }
            AppEvent::PdfLoaded { subject_id, result } => {
                // A later subject change may have overtaken this response
                if self.pdf != PdfState::Loading(subject_id) {
                    tracing::debug!("Dropping stale textbook response for subject {}", subject_id);
                    return Vec::new();
                }
                self.pdf = match result {
                    Ok(doc) => PdfState::Ready(doc),
                    Err(ApiError::NotFound(_)) => PdfState::Missing(subject_id),
                    Err(e) => {
                        tracing::error!("Failed to load textbook: {}", e);
                        PdfState::Failed { subject_id, message: e.user_message() }
                    }
                };
            }
            AppEvent::PdfDownloaded { doc, result } => {
                let current = matches!(&self.pdf, PdfState::Downloading(d) if *d == doc);
                match result {
                    Ok((path, bytes)) => {
                        self.command_line.set_message(format!("تم الحفظ في {}", path.display()));
                        if current {
                            self.pdf = PdfState::Downloaded { doc, path, bytes };
                        }
                    }
                    Err(e) => {
                        tracing::error!("Textbook download failed: {}", e);
                        self.command_line.set_error(e.user_message());
                        if current {
                            self.pdf = PdfState::Ready(doc);
                        }
                    }
                }
            }
            AppEvent::Chat { seq, event } => self.chat.apply_event(seq, event),
            AppEvent::ChatFinished { seq, result } => self.chat.finish(seq, result),
        }
        Vec::new()
    }

    /// Mode indicator for the status line
    pub fn mode_label(&self) -> &'static str {
        match (self.command_line.mode, self.focus) {
            (CommandMode::Command, _) => "COMMAND",
            (_, Focus::Chat) => "CHAT",
            (_, Focus::Lesson) => "LESSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{Lesson, Objective, Subject, Unit};
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;

    const VERSE: &str = "أُصَدِّقُ كِتابي";

    fn tree() -> Vec<Grade> {
        let lesson = |id, content: Option<&str>| Lesson {
            id,
            title: format!("درس {id}"),
            content: content.map(str::to_string),
            objectives: vec![Objective { id, text: "قراءة: يقرأ النص".into() }],
        };
        vec![Grade {
            id: 1,
            name: "الصف الأول".into(),
            subjects: vec![
                Subject {
                    id: 10,
                    name: "اللغة العربية".into(),
                    units: vec![Unit {
                        id: 100,
                        name: "الوحدة الأولى".into(),
                        lessons: vec![lesson(1000, Some(VERSE)), lesson(1001, None)],
                    }],
                },
                Subject { id: 11, name: "العلوم".into(), units: vec![] },
            ],
        }]
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.handle_app_event(AppEvent::NavigationLoaded(Ok(tree())));
        state
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent { kind, column: x, row: y, modifiers: KeyModifiers::NONE }
    }

    fn drag_select(state: &mut AppState, from: (u16, u16), to: (u16, u16)) {
        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), from.0, from.1));
        state.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), to.0, to.1));
        state.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), to.0, to.1));
    }

    fn with_rendered_lesson(state: &mut AppState) {
        state.selection.set_region(Rect::new(2, 4, 40, 10), vec![VERSE.to_string()]);
        state.hits.lesson = Rect::new(1, 3, 42, 12);
        state.hits.chat = Rect::new(50, 3, 30, 12);
        state.hits.chat_input = Rect::new(51, 13, 28, 1);
    }

    #[test]
    fn navigation_load_selects_first_lesson() {
        let state = loaded();
        assert_eq!(state.nav_status, LoadStatus::Ready);
        assert_eq!(state.navigation.selection().lesson_id, Some(1000));
        assert_eq!(state.navigation.tab(), Tab::Content);
    }

    #[test]
    fn navigation_failure_is_shown() {
        let mut state = AppState::default();
        state.handle_app_event(AppEvent::NavigationLoaded(Err(ApiError::ApiError {
            status: 500,
            message: "db down".into(),
        })));
        assert!(matches!(state.nav_status, LoadStatus::Failed(_)));
    }

    #[test]
    fn pending_restore_is_applied_on_load() {
        let mut state = AppState::default();
        let mut saved = loaded().navigation.selection();
        saved.lesson_id = Some(1001);
        state.pending_restore = Some(saved);
        state.handle_app_event(AppEvent::NavigationLoaded(Ok(tree())));
        assert_eq!(state.navigation.selection().lesson_id, Some(1001));
        assert_eq!(state.navigation.tab(), Tab::Objectives);
    }

    #[test]
    fn select_text_then_ask_reaches_chat_input() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);

        drag_select(&mut state, (2, 4), (11, 4));
        assert!(state.selection.is_active());
        assert_eq!(state.selection.state().selected_text, VERSE);

        let ask = state.popup.actions().iter().position(|a| a.label == "اسأل عن").unwrap();
        let digit = char::from_digit(ask as u32 + 1, 10).unwrap();
        state.handle_key(key(KeyCode::Char(digit)));

        assert!(state.chat_input.text().contains(VERSE));
        assert!(!state.selection.is_active());
        assert_eq!(state.focus, Focus::Chat);
    }

    #[test]
    fn scrolling_lesson_clears_selection() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        state.lesson_view.total_lines = 40;
        state.lesson_view.visible_height = 10;

        drag_select(&mut state, (2, 4), (11, 4));
        assert!(state.selection.is_active());
        state.handle_mouse(mouse(MouseEventKind::ScrollDown, 5, 6));
        assert_eq!(state.lesson_view.scroll_offset, 3);
        assert!(!state.selection.is_active());

        drag_select(&mut state, (2, 4), (11, 4));
        assert!(state.selection.is_active());
        state.handle_key(key(KeyCode::Char('j')));
        assert_eq!(state.lesson_view.scroll_offset, 4);
        assert!(!state.selection.is_active());
    }

    #[test]
    fn scrolling_at_the_top_keeps_selection() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));

        state.handle_mouse(mouse(MouseEventKind::ScrollUp, 5, 6));
        assert_eq!(state.lesson_view.scroll_offset, 0);
        assert!(state.selection.is_active());
    }

    #[test]
    fn lesson_width_keys_resize_within_bounds() {
        let mut state = loaded();
        assert_eq!(state.lesson_width_percent, 60);

        state.handle_key(key(KeyCode::Char('>')));
        assert_eq!(state.lesson_width_percent, 65);

        for _ in 0..10 {
            state.handle_key(key(KeyCode::Char('>')));
        }
        assert_eq!(state.lesson_width_percent, MAX_LESSON_WIDTH);

        for _ in 0..20 {
            state.handle_key(key(KeyCode::Char('<')));
        }
        assert_eq!(state.lesson_width_percent, MIN_LESSON_WIDTH);
    }

    #[test]
    fn clicking_popup_button_triggers_action() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));

        let anchor = state.selection.state().position.unwrap();
        let layout = state.popup.layout(anchor, Rect::new(0, 0, 100, 30), std::time::Instant::now());
        let first = layout.buttons[0];
        state.popup.set_layout(Some(layout));

        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), first.x, first.y));
        assert_eq!(state.chat_input.text(), format!("اشرح \"{VERSE}\""));
        assert!(!state.selection.is_active());
    }

    #[test]
    fn copy_action_requests_clipboard() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));

        let copy = state.popup.actions().iter().position(|a| a.label == "نسخ").unwrap();
        let effects = state.handle_key(key(KeyCode::Char(char::from_digit(copy as u32 + 1, 10).unwrap())));
        assert!(matches!(effects.as_slice(), [Effect::Copy(t)] if t == VERSE));
        assert!(state.selection.is_active());
    }

    #[test]
    fn click_in_content_after_selection_is_suppressed_once() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));

        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 6));
        assert!(state.selection.is_active());
        assert!(!state.selection.suppression_pending());
    }

    #[test]
    fn click_outside_content_clears_selection() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));

        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 60, 5));
        assert!(!state.selection.is_active());
        assert_eq!(state.selection.state().position, None);
        assert_eq!(state.focus, Focus::Chat);
    }

    #[test]
    fn clicking_chat_input_clears_selection() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));

        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 55, 13));
        assert!(!state.selection.is_active());
        assert_eq!(state.focus, Focus::Chat);
    }

    #[test]
    fn selection_outside_content_is_ignored() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (55, 5), (70, 5));
        assert!(!state.selection.is_active());
    }

    #[test]
    fn escape_dismisses_selection() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        drag_select(&mut state, (2, 4), (11, 4));
        state.handle_key(key(KeyCode::Esc));
        assert!(!state.selection.is_active());
    }

    #[test]
    fn textbook_tab_fetches_pdf_once() {
        let mut state = loaded();
        let effects = state.handle_key(key(KeyCode::Char('[')));
        assert!(matches!(effects.as_slice(), [Effect::FetchPdf(10)]));
        assert_eq!(state.pdf, PdfState::Loading(10));

        // Leaving and returning to the tab does not refetch
        state.handle_key(key(KeyCode::Char(']')));
        assert!(state.handle_key(key(KeyCode::Char('['))).is_empty());
    }

    #[test]
    fn stale_pdf_response_is_dropped() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Char('[')));
        state.pdf = PdfState::Loading(11);

        let doc = PdfDocument { id: 1, title: "كتاب".into(), url: "u".into(), subject_id: 10 };
        state.handle_app_event(AppEvent::PdfLoaded { subject_id: 10, result: Ok(doc) });
        assert_eq!(state.pdf, PdfState::Loading(11));

        state.handle_app_event(AppEvent::PdfLoaded {
            subject_id: 11,
            result: Err(ApiError::NotFound("subject 11".into())),
        });
        assert_eq!(state.pdf, PdfState::Missing(11));
    }

    #[test]
    fn download_requires_loaded_textbook() {
        let mut state = loaded();
        let doc = PdfDocument { id: 1, title: "كتاب".into(), url: "u".into(), subject_id: 10 };
        state.pdf = PdfState::Ready(doc.clone());
        state.navigation.select_tab(Tab::Textbook);

        let effects = state.handle_key(key(KeyCode::Char('D')));
        assert!(matches!(effects.as_slice(), [Effect::DownloadPdf(d)] if *d == doc));
        assert_eq!(state.pdf, PdfState::Downloading(doc.clone()));

        state.handle_app_event(AppEvent::PdfDownloaded {
            doc: doc.clone(),
            result: Ok((PathBuf::from("/tmp/book.pdf"), 42)),
        });
        assert!(matches!(state.pdf, PdfState::Downloaded { bytes: 42, .. }));
    }

    #[test]
    fn chat_submit_sends_request() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Char('i')));
        for c in "ما الفاعل؟".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        let effects = state.handle_key(key(KeyCode::Enter));
        let seq = match effects.as_slice() {
            [Effect::SendChat(outgoing)] => outgoing.seq,
            other => panic!("expected a chat request, got {:?}", other),
        };
        assert!(state.chat_input.text().is_empty());
        assert!(state.chat.is_streaming());

        let event = StreamEvent::TextDelta { text: "جواب".into() };
        state.handle_app_event(AppEvent::Chat { seq, event });
        state.handle_app_event(AppEvent::ChatFinished { seq, result: Ok(()) });
        assert_eq!(state.chat.messages.len(), 2);
    }

    #[test]
    fn clear_command_drops_events_of_old_request() {
        let mut state = loaded();
        let old = match state.execute_command(Command::Ask("سؤال قديم".into())).as_slice() {
            [Effect::SendChat(outgoing)] => outgoing.seq,
            other => panic!("expected a chat request, got {:?}", other),
        };
        state.execute_command(Command::Clear);
        let new = match state.execute_command(Command::Ask("سؤال جديد".into())).as_slice() {
            [Effect::SendChat(outgoing)] => outgoing.seq,
            other => panic!("expected a chat request, got {:?}", other),
        };

        let event = StreamEvent::TextDelta { text: "رد قديم".into() };
        state.handle_app_event(AppEvent::Chat { seq: old, event });
        state.handle_app_event(AppEvent::ChatFinished { seq: old, result: Err(ApiError::Cancelled) });
        assert!(state.chat.is_streaming());
        assert!(state.chat.pending.is_empty());

        state.handle_app_event(AppEvent::ChatFinished { seq: new, result: Ok(()) });
        assert!(!state.chat.is_streaming());
        assert_eq!(state.chat.messages.len(), 1);
    }

    #[test]
    fn preset_menu_fills_input() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Char('p')));
        assert_eq!(state.overlay, Overlay::Presets { highlighted: 0 });
        state.handle_key(key(KeyCode::Char('j')));
        state.handle_key(key(KeyCode::Enter));

        assert_eq!(state.overlay, Overlay::None);
        assert_eq!(state.chat_input.text(), PRESET_PROMPTS[1].text);
        assert_eq!(state.chat_input.message_type(), Some(PRESET_PROMPTS[1].text));
    }

    #[test]
    fn quote_keeps_preset_prefix() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        state.execute_command(Command::Preset(1));
        state.focus = Focus::Lesson;

        drag_select(&mut state, (2, 4), (11, 4));
        let quote = state.popup.actions().iter().position(|a| a.label == "اقتبس").unwrap();
        state.handle_key(key(KeyCode::Char(char::from_digit(quote as u32 + 1, 10).unwrap())));

        assert_eq!(state.chat_input.text(), format!("{}{VERSE}", PRESET_PROMPTS[1].text));
    }

    #[test]
    fn dropdown_selects_lesson() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Char('4')));
        assert!(matches!(state.overlay, Overlay::Dropdown(DropdownState { level: Level::Lesson, .. })));
        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Enter));

        assert_eq!(state.overlay, Overlay::None);
        assert_eq!(state.navigation.selection().lesson_id, Some(1001));
        assert_eq!(state.navigation.tab(), Tab::Objectives);
    }

    #[test]
    fn questions_tab_enter_inserts_prompt() {
        let mut state = loaded();
        state.navigation.select_tab(Tab::Questions);
        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Enter));
        assert!(state.chat_input.text().ends_with("يقرأ النص"));
        assert_eq!(state.focus, Focus::Chat);
    }

    #[test]
    fn command_line_selects_and_reports_errors() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Char(':')));
        for c in "lesson 999".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        state.handle_key(key(KeyCode::Enter));
        assert!(state.command_line.is_error);
        assert_eq!(state.navigation.selection().lesson_id, Some(1000));

        state.handle_key(key(KeyCode::Char(':')));
        for c in "q".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        assert!(matches!(state.handle_key(key(KeyCode::Enter)).as_slice(), [Effect::Quit]));
    }

    #[test]
    fn reload_keeps_place() {
        let mut state = loaded();
        state.execute_command(Command::Select(Level::Lesson, 1001));
        let effects = state.reload();
        assert!(matches!(effects.as_slice(), [Effect::FetchNavigation]));
        assert_eq!(state.nav_status, LoadStatus::Loading);

        state.handle_app_event(AppEvent::NavigationLoaded(Ok(tree())));
        assert_eq!(state.navigation.selection().lesson_id, Some(1001));
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut state = loaded();
        state.focus = Focus::Chat;
        let effects = state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(effects.as_slice(), [Effect::Quit]));
    }

    #[test]
    fn press_target_classification_prefers_clickables() {
        let mut state = loaded();
        with_rendered_lesson(&mut state);
        state.hits.tabs = vec![(Tab::Objectives, Rect::new(2, 4, 8, 1))];
        // The tab overlaps the content row, so the press is a click, not a drag
        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 4));
        assert_eq!(state.navigation.tab(), Tab::Objectives);
        assert!(!state.selection.is_active());
    }
}
