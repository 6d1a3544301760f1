//! Text selection over the lesson panel
//!
//! The terminal has no native selection, so a left-button drag over the
//! rendered lesson rows plays that role. On release the selected text and an
//! anchor cell above it are published for the popup. The next press is then
//! swallowed once, so clicking near the text does not wipe the selection
//! before an action button is clicked.

use ratatui::layout::{Position, Rect};

/// Rows between the top of the selection and the anchor
pub const DEFAULT_ANCHOR_OFFSET: u16 = 1;

/// What a pointer press landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// The selection popup itself
    Popup,
    /// A button, tab, or other element that reacts to clicks
    Clickable,
    /// The lesson content region
    Content,
    /// Anywhere else
    Elsewhere,
}

/// How the controller treated a press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// The press was swallowed to keep the current selection alive
    Suppressed,
    /// A new drag started in the content region
    Began,
    /// Nothing for the controller to do
    Ignored,
}

/// Published selection, read by the popup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_text: String,
    pub position: Option<Position>,
    pub active: bool,
}

/// Drag in progress: where the button went down and where the pointer is now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    anchor: Position,
    focus: Position,
}

impl Drag {
    /// Endpoints ordered by row, then column
    fn normalized(&self) -> (Position, Position) {
        let (a, b) = (self.anchor, self.focus);
        if (a.y, a.x) <= (b.y, b.x) { (a, b) } else { (b, a) }
    }
}

/// Tracks drags over the content region and publishes selections
#[derive(Debug, Clone)]
pub struct SelectionController {
    state: SelectionState,
    /// Screen area of the content region
    region: Rect,
    /// Plain text of each visible row of the region, top to bottom
    rows: Vec<String>,
    drag: Option<Drag>,
    /// Range of the published selection, kept for highlighting
    highlight: Option<(Position, Position)>,
    /// One-shot guard armed after each published selection
    suppress_next_press: bool,
    anchor_offset: u16,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_OFFSET)
    }
}

impl SelectionController {
    /// Create a controller placing the anchor `anchor_offset` rows above selections
    pub fn new(anchor_offset: u16) -> Self {
        Self {
            state: SelectionState::default(),
            region: Rect::default(),
            rows: Vec::new(),
            drag: None,
            highlight: None,
            suppress_next_press: false,
            anchor_offset,
        }
    }

    /// Record the content region and its visible text (called on every render)
    pub fn set_region(&mut self, region: Rect, rows: Vec<String>) {
        self.region = region;
        self.rows = rows;
    }

    /// The content region as last rendered
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Cells to highlight: the live drag if any, else the published selection
    pub fn highlight(&self) -> Option<(Position, Position)> {
        self.drag.map(|d| d.normalized()).or(self.highlight)
    }

    /// Whether the next press will be swallowed
    pub fn suppression_pending(&self) -> bool {
        self.suppress_next_press
    }

    /// Handle a pointer press
    pub fn press(&mut self, position: Position, target: PressTarget) -> PressOutcome {
        if self.state.active && target != PressTarget::Popup && !self.region.contains(position) {
            self.clear();
        }

        if std::mem::take(&mut self.suppress_next_press)
            && !matches!(target, PressTarget::Popup | PressTarget::Clickable)
        {
            tracing::trace!("Suppressed press at {:?}", position);
            return PressOutcome::Suppressed;
        }

        if target == PressTarget::Content {
            self.drag = Some(Drag { anchor: position, focus: position });
            PressOutcome::Began
        } else {
            PressOutcome::Ignored
        }
    }

    /// Extend the live drag
    pub fn drag_to(&mut self, position: Position) {
        if let Some(drag) = self.drag.as_mut() {
            drag.focus = position;
        }
    }

    /// Handle a pointer release, publishing the selection when there is one.
    ///
    /// Returns whether a selection was published.
    pub fn release(&mut self, position: Position) -> bool {
        let Some(mut drag) = self.drag.take() else {
            return false;
        };
        drag.focus = position;

        if drag.anchor == drag.focus {
            return false;
        }
        if !self.region.contains(drag.anchor) || !self.region.contains(drag.focus) {
            tracing::trace!("Ignoring selection outside the content region");
            return false;
        }

        let (start, end) = drag.normalized();
        let text = self.text_between(start, end);
        if text.is_empty() {
            return false;
        }

        let anchor = self.anchor_for(start, end);
        tracing::debug!("Selected {} chars, anchor at {:?}", text.chars().count(), anchor);

        self.state = SelectionState { selected_text: text, position: Some(anchor), active: true };
        self.highlight = Some((start, end));
        self.suppress_next_press = true;
        true
    }

    /// Drop the published selection and any pending guard
    pub fn clear(&mut self) {
        self.state = SelectionState::default();
        self.highlight = None;
        self.drag = None;
        self.suppress_next_press = false;
    }

    /// Selected text between two cells, inclusive, with whitespace collapsed
    fn text_between(&self, start: Position, end: Position) -> String {
        let mut pieces = Vec::new();

        for y in start.y..=end.y {
            let Some(row) = self.rows.get((y - self.region.y) as usize) else {
                continue;
            };
            let from = if y == start.y { start.x - self.region.x } else { 0 };
            let to = if y == end.y { end.x - self.region.x } else { u16::MAX };
            pieces.push(slice_columns(row, from, to));
        }

        pieces.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Centre of the selection's bounding box, just above its top edge
    fn anchor_for(&self, start: Position, end: Position) -> Position {
        let row_right = |y: u16| {
            let width = self
                .rows
                .get((y - self.region.y) as usize)
                .map(|row| textwrap::core::display_width(row))
                .unwrap_or(0);
            self.region.x + (width as u16).min(self.region.width)
        };

        let (left, right) = if start.y == end.y {
            (start.x, end.x + 1)
        } else {
            let right = (start.y..=end.y).map(row_right).max().unwrap_or(end.x + 1);
            (self.region.x, right.max(end.x + 1))
        };

        Position { x: left + (right.saturating_sub(left)) / 2, y: start.y.saturating_sub(self.anchor_offset) }
    }
}

/// Characters of `row` occupying display columns `from..=to`.
///
/// Zero-width marks (Arabic harakat) travel with the character they follow.
pub fn slice_columns(row: &str, from: u16, to: u16) -> String {
    let mut out = String::new();
    let mut col: u16 = 0;
    let mut prev_included = false;
    let mut buf = [0u8; 4];

    for ch in row.chars() {
        let width = textwrap::core::display_width(ch.encode_utf8(&mut buf)) as u16;
        let included = if width == 0 { prev_included } else { col >= from && col <= to };
        if included {
            out.push(ch);
        }
        prev_included = included;
        col = col.saturating_add(width);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const VERSE: &str = "أُصَدِّقُ كِتابي";

    fn controller() -> SelectionController {
        let mut c = SelectionController::new(1);
        c.set_region(
            Rect::new(10, 5, 40, 4),
            vec![
                VERSE.to_string(),
                "السطر الثاني".to_string(),
                "line three".to_string(),
                String::new(),
            ],
        );
        c
    }

    fn pos(x: u16, y: u16) -> Position {
        Position { x, y }
    }

    fn select(c: &mut SelectionController, from: Position, to: Position) -> bool {
        c.press(from, PressTarget::Content);
        c.drag_to(to);
        c.release(to)
    }

    #[test]
    fn slice_keeps_harakat_with_letters() {
        // Ten visible cells: five letters, a space, then four letters
        assert_eq!(textwrap::core::display_width(VERSE), 10);
        assert_eq!(slice_columns(VERSE, 0, 9), VERSE);
        assert_eq!(slice_columns(VERSE, 0, 3), "أُصَدِّقُ");
        assert_eq!(slice_columns(VERSE, 5, 9), "كِتابي");
    }

    #[test]
    fn release_publishes_text_and_anchor() {
        let mut c = controller();
        assert!(select(&mut c, pos(10, 5), pos(19, 5)));

        let state = c.state();
        assert!(state.active);
        assert_eq!(state.selected_text, VERSE);
        assert_eq!(state.position, Some(pos(15, 4)));
        assert!(c.suppression_pending());
    }

    #[test]
    fn backwards_drag_is_normalized() {
        let mut c = controller();
        assert!(select(&mut c, pos(19, 7), pos(10, 7)));
        assert_eq!(c.state().selected_text, "line three");
    }

    #[test]
    fn multi_row_selection_joins_rows() {
        let mut c = controller();
        assert!(select(&mut c, pos(15, 5), pos(14, 6)));
        assert_eq!(c.state().selected_text, "كِتابي السطر");
        let anchor = c.state().position.unwrap();
        assert_eq!(anchor.y, 4);
        assert!(anchor.x >= 10 && anchor.x < 50);
    }

    #[test]
    fn anchor_row_saturates_at_top() {
        let mut c = SelectionController::new(3);
        c.set_region(Rect::new(0, 0, 20, 2), vec!["abc".into()]);
        assert!(select(&mut c, pos(0, 0), pos(2, 0)));
        assert_eq!(c.state().position, Some(pos(1, 0)));
    }

    #[test]
    fn collapsed_release_is_a_no_op() {
        let mut c = controller();
        select(&mut c, pos(10, 5), pos(19, 5));
        let before = c.state().clone();

        // Suppressed press consumes the guard, then a plain click
        assert_eq!(c.press(pos(12, 6), PressTarget::Content), PressOutcome::Suppressed);
        assert_eq!(c.press(pos(12, 6), PressTarget::Content), PressOutcome::Began);
        assert!(!c.release(pos(12, 6)));
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn whitespace_only_selection_is_ignored() {
        let mut c = controller();
        assert!(!select(&mut c, pos(10, 8), pos(20, 8)));
        assert!(!c.is_active());
    }

    #[test]
    fn selection_outside_region_is_ignored() {
        let mut c = controller();
        assert!(!select(&mut c, pos(2, 5), pos(19, 5)));
        assert!(!select(&mut c, pos(12, 5), pos(12, 12)));
        assert!(!c.is_active());
    }

    #[test]
    fn suppression_is_consumed_once() {
        let mut c = controller();
        select(&mut c, pos(10, 5), pos(19, 5));
        assert_eq!(c.press(pos(11, 6), PressTarget::Content), PressOutcome::Suppressed);
        assert!(!c.suppression_pending());
        assert!(c.is_active());
    }

    #[test]
    fn clicks_on_popup_and_buttons_are_not_suppressed() {
        let mut c = controller();
        select(&mut c, pos(10, 5), pos(19, 5));
        assert_eq!(c.press(pos(15, 3), PressTarget::Popup), PressOutcome::Ignored);
        assert!(!c.suppression_pending());
        assert!(c.is_active());

        select(&mut c, pos(10, 5), pos(19, 5));
        assert_eq!(c.press(pos(12, 7), PressTarget::Clickable), PressOutcome::Ignored);
        assert!(c.is_active());
    }

    #[test]
    fn click_outside_region_clears() {
        let mut c = controller();
        select(&mut c, pos(10, 5), pos(19, 5));
        assert_eq!(c.press(pos(0, 0), PressTarget::Clickable), PressOutcome::Ignored);
        assert!(!c.is_active());
    }

    #[test]
    fn press_elsewhere_clears() {
        let mut c = controller();
        select(&mut c, pos(10, 5), pos(19, 5));
        c.press(pos(70, 20), PressTarget::Elsewhere);
        assert_eq!(c.state(), &SelectionState::default());
        assert!(c.highlight().is_none());
    }

    #[test]
    fn explicit_clear_resets_everything() {
        let mut c = controller();
        select(&mut c, pos(10, 5), pos(19, 5));
        c.clear();
        assert_eq!(c.state().selected_text, "");
        assert_eq!(c.state().position, None);
        assert!(!c.is_active());
        assert!(!c.suppression_pending());
    }

    #[test]
    fn release_without_press_does_nothing() {
        let mut c = controller();
        assert!(!c.release(pos(12, 5)));
    }

    proptest! {
        #[test]
        fn outside_endpoints_never_activate(
            ax in 0u16..80, ay in 0u16..20, bx in 0u16..80, by in 0u16..20,
        ) {
            let mut c = controller();
            let region = c.region();
            let (a, b) = (pos(ax, ay), pos(bx, by));
            prop_assume!(!region.contains(a) || !region.contains(b));
            select(&mut c, a, b);
            prop_assert!(!c.is_active());
        }

        #[test]
        fn clear_always_empties(ax in 10u16..50, ay in 5u16..9, bx in 10u16..50, by in 5u16..9) {
            let mut c = controller();
            select(&mut c, pos(ax, ay), pos(bx, by));
            c.clear();
            prop_assert_eq!(c.state().selected_text.as_str(), "");
            prop_assert!(c.state().position.is_none());
            prop_assert!(!c.is_active());
        }
    }
}
