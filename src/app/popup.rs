//! Action popup shown over an active selection

use std::time::{Duration, Instant};

use ratatui::layout::{Position, Rect};

use super::bridge::ChatInputBridge;
use super::selection::SelectionController;

/// How long the "copied" indicator stays up
pub const DEFAULT_COPIED_DURATION: Duration = Duration::from_secs(2);

/// Popup height: one row of buttons inside a border
const POPUP_HEIGHT: u16 = 3;
/// Columns between buttons
const BUTTON_GAP: u16 = 1;

/// What a popup button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Insert `<verb> "<text>"` into the chat input
    Prompt(&'static str),
    /// Insert the raw text, keeping the active message type
    Quote,
    /// Put the text on the system clipboard
    Copy,
    /// Drop the selection
    Dismiss,
}

/// Colour family of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Blue,
    Green,
    Purple,
    Amber,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupAction {
    pub label: &'static str,
    pub kind: ActionKind,
    pub tone: Tone,
}

pub const DEFAULT_ACTIONS: &[PopupAction] = &[
    PopupAction { label: "اشرح", kind: ActionKind::Prompt("اشرح"), tone: Tone::Blue },
    PopupAction { label: "لخص", kind: ActionKind::Prompt("لخص"), tone: Tone::Green },
    PopupAction { label: "ترجم", kind: ActionKind::Prompt("ترجم"), tone: Tone::Purple },
    PopupAction { label: "اسأل عن", kind: ActionKind::Prompt("اسأل عن"), tone: Tone::Blue },
    PopupAction { label: "اقتبس", kind: ActionKind::Quote, tone: Tone::Amber },
    PopupAction { label: "نسخ", kind: ActionKind::Copy, tone: Tone::Neutral },
    PopupAction { label: "✕", kind: ActionKind::Dismiss, tone: Tone::Neutral },
];

/// Label shown on the copy button while the indicator is up
pub const COPIED_LABEL: &str = "تم النسخ ✓";

/// Result of triggering an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupOutcome {
    /// Text was handed to the chat input
    Inserted,
    /// Caller should write this text to the clipboard
    Copy(String),
    /// The selection was dropped
    Dismissed,
    /// Nothing happened (no selection, no such action, or no input registered)
    Nothing,
}

/// Computed screen placement of the popup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupLayout {
    pub area: Rect,
    /// One rect per action, in action order
    pub buttons: Vec<Rect>,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Popup actions plus the copied indicator and last drawn layout
#[derive(Debug, Clone)]
pub struct SelectionPopup {
    actions: Vec<PopupAction>,
    copied_at: Option<Instant>,
    copied_duration: Duration,
    layout: Option<PopupLayout>,
}

impl Default for SelectionPopup {
    fn default() -> Self {
        Self::new(DEFAULT_COPIED_DURATION)
    }
}

impl SelectionPopup {
    pub fn new(copied_duration: Duration) -> Self {
        Self {
            actions: DEFAULT_ACTIONS.to_vec(),
            copied_at: None,
            copied_duration,
            layout: None,
        }
    }

    pub fn actions(&self) -> &[PopupAction] {
        &self.actions
    }

    /// Button label, accounting for the copied indicator
    pub fn label(&self, action: &PopupAction, now: Instant) -> &'static str {
        if action.kind == ActionKind::Copy && self.copied_visible(now) {
            COPIED_LABEL
        } else {
            action.label
        }
    }

    fn button_width(label: &str) -> u16 {
        textwrap::core::display_width(label) as u16 + 2
    }

    /// Place the popup centred above `anchor`, clamped inside `viewport`
    pub fn layout(&self, anchor: Position, viewport: Rect, now: Instant) -> PopupLayout {
        let widths: Vec<u16> =
            self.actions.iter().map(|a| Self::button_width(self.label(a, now))).collect();
        let inner: u16 = widths.iter().sum::<u16>()
            + BUTTON_GAP * (widths.len().saturating_sub(1) as u16);
        let width = (inner + 2).min(viewport.width);
        let height = POPUP_HEIGHT.min(viewport.height);

        // Bottom border sits on the anchor row
        let x = anchor.x.saturating_sub(width / 2).clamp(viewport.x, viewport.right() - width);
        let y = (anchor.y + 1)
            .saturating_sub(height)
            .clamp(viewport.y, viewport.bottom() - height);
        let area = Rect::new(x, y, width, height);

        let mut buttons = Vec::with_capacity(widths.len());
        let mut bx = area.x + 1;
        for w in widths {
            let visible = w.min(area.right().saturating_sub(1).saturating_sub(bx));
            buttons.push(Rect::new(bx, area.y + 1, visible, 1.min(height)));
            bx = bx.saturating_add(w + BUTTON_GAP);
        }

        PopupLayout { area, buttons }
    }

    /// Remember where the popup was drawn, for hit testing
    pub fn set_layout(&mut self, layout: Option<PopupLayout>) {
        self.layout = layout;
    }

    /// Area of the popup as last drawn
    pub fn area(&self) -> Option<Rect> {
        self.layout.as_ref().map(|l| l.area)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.area().is_some_and(|a| a.contains(position))
    }

    /// Index of the button under `position`
    pub fn action_at(&self, position: Position) -> Option<usize> {
        self.layout.as_ref()?.buttons.iter().position(|b| b.width > 0 && b.contains(position))
    }

    /// Run the action at `index` against the current selection
    pub fn trigger(
        &mut self,
        index: usize,
        selection: &mut SelectionController,
        bridge: &ChatInputBridge,
    ) -> PopupOutcome {
        let Some(action) = self.actions.get(index).copied() else {
            return PopupOutcome::Nothing;
        };
        if !selection.is_active() {
            return PopupOutcome::Nothing;
        }

        let text = selection.state().selected_text.clone();
        tracing::debug!("Popup action {:?}", action.kind);

        let outcome = match action.kind {
            ActionKind::Prompt(verb) => {
                if bridge.insert(format!("{verb} \"{text}\""), false) {
                    PopupOutcome::Inserted
                } else {
                    PopupOutcome::Nothing
                }
            }
            ActionKind::Quote => {
                if bridge.insert(text, true) {
                    PopupOutcome::Inserted
                } else {
                    PopupOutcome::Nothing
                }
            }
            ActionKind::Copy => return PopupOutcome::Copy(text),
            ActionKind::Dismiss => PopupOutcome::Dismissed,
        };

        selection.clear();
        self.layout = None;
        outcome
    }

    /// Record the clipboard write result. Failures are logged only.
    pub fn copy_finished(&mut self, result: Result<(), ClipboardError>, now: Instant) {
        match result {
            Ok(()) => self.copied_at = Some(now),
            Err(e) => tracing::warn!("Copy failed: {}", e),
        }
    }

    pub fn copied_visible(&self, now: Instant) -> bool {
        self.copied_at.is_some_and(|at| now.duration_since(at) < self.copied_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bridge::InputEdit;
    use crate::app::selection::PressTarget;
    use pretty_assertions::assert_eq;

    const VERSE: &str = "أُصَدِّقُ كِتابي";

    fn selected() -> SelectionController {
        let mut c = SelectionController::new(1);
        c.set_region(Rect::new(0, 2, 40, 3), vec![VERSE.to_string()]);
        c.press(Position { x: 0, y: 2 }, PressTarget::Content);
        c.release(Position { x: 9, y: 2 });
        assert!(c.is_active());
        c
    }

    fn index_of(popup: &SelectionPopup, label: &str) -> usize {
        popup.actions().iter().position(|a| a.label == label).unwrap()
    }

    #[test]
    fn ask_inserts_prompt_and_clears() {
        let mut popup = SelectionPopup::default();
        let mut selection = selected();
        let mut bridge = ChatInputBridge::new();
        let (_reg, mut rx) = bridge.register();

        let outcome = popup.trigger(index_of(&popup, "اسأل عن"), &mut selection, &bridge);

        assert_eq!(outcome, PopupOutcome::Inserted);
        let edit = rx.try_recv().unwrap();
        assert!(edit.text.contains(VERSE));
        assert_eq!(edit.text, format!("اسأل عن \"{VERSE}\""));
        assert!(!edit.preserve_message_type);
        assert!(!selection.is_active());
    }

    #[test]
    fn quote_inserts_raw_text_preserving_type() {
        let mut popup = SelectionPopup::default();
        let mut selection = selected();
        let mut bridge = ChatInputBridge::new();
        let (_reg, mut rx) = bridge.register();

        popup.trigger(index_of(&popup, "اقتبس"), &mut selection, &bridge);
        assert_eq!(rx.try_recv().unwrap(), InputEdit { text: VERSE.into(), preserve_message_type: true });
        assert!(!selection.is_active());
    }

    #[test]
    fn copy_keeps_selection_and_shows_indicator() {
        let mut popup = SelectionPopup::default();
        let mut selection = selected();
        let bridge = ChatInputBridge::new();

        let outcome = popup.trigger(index_of(&popup, "نسخ"), &mut selection, &bridge);
        assert_eq!(outcome, PopupOutcome::Copy(VERSE.into()));
        assert!(selection.is_active());

        let now = Instant::now();
        popup.copy_finished(Ok(()), now);
        assert!(popup.copied_visible(now + Duration::from_millis(1500)));
        assert!(!popup.copied_visible(now + Duration::from_secs(2)));
        let copy = popup.actions()[index_of(&popup, "نسخ")];
        assert_eq!(popup.label(&copy, now), COPIED_LABEL);
    }

    #[test]
    fn failed_copy_shows_nothing() {
        let mut popup = SelectionPopup::default();
        let now = Instant::now();
        popup.copy_finished(Err(ClipboardError("no display".into())), now);
        assert!(!popup.copied_visible(now));
    }

    #[test]
    fn dismiss_clears_selection() {
        let mut popup = SelectionPopup::default();
        let mut selection = selected();
        let bridge = ChatInputBridge::new();
        assert_eq!(popup.trigger(index_of(&popup, "✕"), &mut selection, &bridge), PopupOutcome::Dismissed);
        assert!(!selection.is_active());
    }

    #[test]
    fn trigger_without_selection_does_nothing() {
        let mut popup = SelectionPopup::default();
        let mut selection = SelectionController::default();
        let bridge = ChatInputBridge::new();
        assert_eq!(popup.trigger(0, &mut selection, &bridge), PopupOutcome::Nothing);
        assert_eq!(popup.trigger(99, &mut selected(), &bridge), PopupOutcome::Nothing);
    }

    #[test]
    fn layout_centres_above_anchor() {
        let popup = SelectionPopup::default();
        let viewport = Rect::new(0, 0, 120, 40);
        let layout = popup.layout(Position { x: 60, y: 10 }, viewport, Instant::now());

        assert_eq!(layout.area.height, 3);
        assert_eq!(layout.area.bottom() - 1, 10);
        let centre = layout.area.x + layout.area.width / 2;
        assert!(centre.abs_diff(60) <= 1);
        assert_eq!(layout.buttons.len(), DEFAULT_ACTIONS.len());
    }

    #[test]
    fn layout_is_clamped_into_viewport() {
        let popup = SelectionPopup::default();
        let viewport = Rect::new(0, 0, 80, 24);
        let now = Instant::now();

        let left = popup.layout(Position { x: 0, y: 0 }, viewport, now);
        assert_eq!(left.area.x, 0);
        assert_eq!(left.area.y, 0);

        let right = popup.layout(Position { x: 79, y: 23 }, viewport, now);
        assert_eq!(right.area.right(), 80);
        assert!(right.area.bottom() <= 24);

        let narrow = popup.layout(Position { x: 5, y: 5 }, Rect::new(0, 0, 10, 24), now);
        assert_eq!(narrow.area.width, 10);
    }

    #[test]
    fn hit_testing_uses_last_layout() {
        let mut popup = SelectionPopup::default();
        let layout = popup.layout(Position { x: 60, y: 10 }, Rect::new(0, 0, 120, 40), Instant::now());
        let first = layout.buttons[0];
        popup.set_layout(Some(layout));

        assert_eq!(popup.action_at(Position { x: first.x, y: first.y }), Some(0));
        assert!(popup.contains(Position { x: first.x, y: first.y }));
        assert_eq!(popup.action_at(Position { x: 0, y: 0 }), None);
    }
}
