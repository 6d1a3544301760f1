//! Grade → subject → unit → lesson selection
//!
//! The selection is a path of ids into the fetched tree plus the active tab.
//! Changing a level resets every level below it to the new node's first child,
//! and a lesson without content is never shown on the content tab.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::curriculum::{Grade, Lesson, NodeId, Subject, Unit};

/// A level of the navigation tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Grade,
    Subject,
    Unit,
    Lesson,
}

impl Level {
    /// All levels from root to leaf
    pub const ALL: [Level; 4] = [Level::Grade, Level::Subject, Level::Unit, Level::Lesson];

    /// Arabic label shown in the navigation bar
    pub fn label(&self) -> &'static str {
        match self {
            Self::Grade => "الصف",
            Self::Subject => "المادة",
            Self::Unit => "الوحدة",
            Self::Lesson => "الدرس",
        }
    }

    /// Parse a level name from a command argument
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grade" | "الصف" => Some(Self::Grade),
            "subject" | "المادة" => Some(Self::Subject),
            "unit" | "الوحدة" => Some(Self::Unit),
            "lesson" | "الدرس" => Some(Self::Lesson),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Grade => "grade",
            Self::Subject => "subject",
            Self::Unit => "unit",
            Self::Lesson => "lesson",
        };
        f.write_str(name)
    }
}

/// Tabs of the lesson panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Content,
    Objectives,
    Questions,
    Textbook,
}

impl Tab {
    /// Tabs in display order
    pub const ALL: [Tab; 4] = [Tab::Content, Tab::Objectives, Tab::Questions, Tab::Textbook];

    /// Arabic label shown in the tab strip
    pub fn label(&self) -> &'static str {
        match self {
            Self::Content => "المحتوى",
            Self::Objectives => "الأهداف التعليمية",
            Self::Questions => "الأسئلة",
            Self::Textbook => "الكتاب",
        }
    }

    /// Parse a tab name from a command argument
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "content" | "c" => Some(Self::Content),
            "objectives" | "o" => Some(Self::Objectives),
            "questions" | "q" => Some(Self::Questions),
            "textbook" | "pdf" | "t" => Some(Self::Textbook),
            _ => None,
        }
    }

    /// The tab `delta` positions away, wrapping around
    pub fn offset(&self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let index = Self::ALL.iter().position(|t| t == self).unwrap_or(0) as isize;
        Self::ALL[(index + delta).rem_euclid(len) as usize]
    }
}

/// Path into the navigation tree plus the active tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationSelection {
    pub grade_id: Option<NodeId>,
    pub subject_id: Option<NodeId>,
    pub unit_id: Option<NodeId>,
    pub lesson_id: Option<NodeId>,
    #[serde(default)]
    pub tab: Tab,
}

impl NavigationSelection {
    /// The id stored for a level
    pub fn id(&self, level: Level) -> Option<NodeId> {
        match level {
            Level::Grade => self.grade_id,
            Level::Subject => self.subject_id,
            Level::Unit => self.unit_id,
            Level::Lesson => self.lesson_id,
        }
    }
}

/// Errors raised by selection changes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// The id is not a child of the currently selected parent
    #[error("no {level} with id {id} under the current selection")]
    UnknownId { level: Level, id: NodeId },

    /// The parent level has nothing selected
    #[error("cannot select a {0} before its parent")]
    NoParent(Level),
}

/// A named node of the tree, used by list views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEntry<'a> {
    pub id: NodeId,
    pub name: &'a str,
}

/// Selection state over a fetched navigation tree
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    tree: Vec<Grade>,
    selection: NavigationSelection,
}

impl NavigationState {
    /// Take ownership of a freshly fetched tree and select the first lesson
    pub fn load(tree: Vec<Grade>) -> Self {
        let mut state = Self { tree, selection: NavigationSelection::default() };
        state.selection.grade_id = state.tree.first().map(|g| g.id);
        state.reset_below(Level::Grade);
        state.apply_tab_rule();
        state
    }

    /// The whole tree
    pub fn tree(&self) -> &[Grade] {
        &self.tree
    }

    /// The current selection path
    pub fn selection(&self) -> NavigationSelection {
        self.selection
    }

    /// The active tab
    pub fn tab(&self) -> Tab {
        self.selection.tab
    }

    pub fn current_grade(&self) -> Option<&Grade> {
        let id = self.selection.grade_id?;
        self.tree.iter().find(|g| g.id == id)
    }

    pub fn current_subject(&self) -> Option<&Subject> {
        self.current_grade()?.subject(self.selection.subject_id?)
    }

    pub fn current_unit(&self) -> Option<&Unit> {
        self.current_subject()?.unit(self.selection.unit_id?)
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current_unit()?.lesson(self.selection.lesson_id?)
    }

    /// Whether the current lesson has displayable content
    pub fn has_content(&self) -> bool {
        self.current_lesson().is_some_and(Lesson::has_content)
    }

    /// Children available at `level` under the current selection
    pub fn options(&self, level: Level) -> Vec<NodeEntry<'_>> {
        match level {
            Level::Grade => {
                self.tree.iter().map(|g| NodeEntry { id: g.id, name: &g.name }).collect()
            }
            Level::Subject => self
                .current_grade()
                .map(|g| g.subjects.iter().map(|s| NodeEntry { id: s.id, name: &s.name }).collect())
                .unwrap_or_default(),
            Level::Unit => self
                .current_subject()
                .map(|s| s.units.iter().map(|u| NodeEntry { id: u.id, name: &u.name }).collect())
                .unwrap_or_default(),
            Level::Lesson => self
                .current_unit()
                .map(|u| u.lessons.iter().map(|l| NodeEntry { id: l.id, name: &l.title }).collect())
                .unwrap_or_default(),
        }
    }

    /// Select `id` at `level`, resetting every level below it
    pub fn select(&mut self, level: Level, id: NodeId) -> Result<(), NavigationError> {
        let exists = match level {
            Level::Grade => self.tree.iter().any(|g| g.id == id),
            Level::Subject => {
                let grade = self.current_grade().ok_or(NavigationError::NoParent(level))?;
                grade.subject(id).is_some()
            }
            Level::Unit => {
                let subject = self.current_subject().ok_or(NavigationError::NoParent(level))?;
                subject.unit(id).is_some()
            }
            Level::Lesson => {
                let unit = self.current_unit().ok_or(NavigationError::NoParent(level))?;
                unit.lesson(id).is_some()
            }
        };
        if !exists {
            return Err(NavigationError::UnknownId { level, id });
        }

        match level {
            Level::Grade => self.selection.grade_id = Some(id),
            Level::Subject => self.selection.subject_id = Some(id),
            Level::Unit => self.selection.unit_id = Some(id),
            Level::Lesson => self.selection.lesson_id = Some(id),
        }
        self.reset_below(level);
        self.apply_tab_rule();

        tracing::debug!("Selected {} {}", level, id);
        Ok(())
    }

    /// Select the sibling `delta` positions away at `level`, clamped to the ends
    pub fn step(&mut self, level: Level, delta: isize) -> Result<(), NavigationError> {
        let options = self.options(level);
        if options.is_empty() {
            return Err(NavigationError::NoParent(level));
        }
        let current = self.selection.id(level);
        let index = options.iter().position(|o| Some(o.id) == current).unwrap_or(0) as isize;
        let target = (index + delta).clamp(0, options.len() as isize - 1) as usize;
        let id = options[target].id;
        self.select(level, id)
    }

    /// Switch tabs, then correct the tab if the lesson has no content
    pub fn select_tab(&mut self, tab: Tab) {
        self.selection.tab = tab;
        self.apply_tab_rule();
    }

    /// Re-apply a saved selection, keeping defaults wherever an id vanished
    pub fn restore(&mut self, saved: NavigationSelection) {
        for level in Level::ALL {
            let Some(id) = saved.id(level) else { break };
            if let Err(e) = self.select(level, id) {
                tracing::info!("Saved selection no longer valid: {}", e);
                break;
            }
        }
        self.select_tab(saved.tab);
    }

    /// Never show the content tab for a lesson without content
    fn apply_tab_rule(&mut self) {
        if self.selection.tab == Tab::Content && !self.has_content() {
            tracing::debug!("Lesson has no content, switching to objectives");
            self.selection.tab = Tab::Objectives;
        }
    }

    /// Point every level below `level` at the first child of its parent
    fn reset_below(&mut self, level: Level) {
        if level == Level::Grade {
            self.selection.subject_id =
                self.current_grade().and_then(Grade::first_subject).map(|s| s.id);
        }
        if matches!(level, Level::Grade | Level::Subject) {
            self.selection.unit_id =
                self.current_subject().and_then(Subject::first_unit).map(|u| u.id);
        }
        if level != Level::Lesson {
            self.selection.lesson_id =
                self.current_unit().and_then(Unit::first_lesson).map(|l| l.id);
        }
    }
}
