//! Navigation tree model
//!
//! The backend returns the whole curriculum as a single nested document:
//! grades own subjects, subjects own units, units own lessons and lessons
//! own their learning objectives. Every list arrives sorted by ascending id.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier type used by every node in the tree
pub type NodeId = i64;

/// Matches any markup tag
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// A school grade, the root of the navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Grade {
    /// Find a subject of this grade by id
    pub fn subject(&self, id: NodeId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// The first subject, if any
    pub fn first_subject(&self) -> Option<&Subject> {
        self.subjects.first()
    }
}

/// A subject taught in a grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Subject {
    /// Find a unit of this subject by id
    pub fn unit(&self, id: NodeId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// The first unit, if any
    pub fn first_unit(&self) -> Option<&Unit> {
        self.units.first()
    }
}

/// A unit grouping several lessons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Unit {
    /// Find a lesson of this unit by id
    pub fn lesson(&self, id: NodeId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// The first lesson, if any
    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lessons.first()
    }
}

/// A single lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: NodeId,
    pub title: String,
    /// Raw lesson body; plain text or an HTML fragment
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl Lesson {
    /// Whether the lesson has something worth showing in the content tab.
    ///
    /// Markup and non-breaking spaces alone do not count as content.
    pub fn has_content(&self) -> bool {
        let Some(content) = self.content.as_deref() else {
            return false;
        };
        let stripped = TAG_RE.replace_all(content, " ");
        stripped.replace("&nbsp;", " ").replace('\u{a0}', " ").chars().any(|c| !c.is_whitespace())
    }

    /// Plain text of the lesson body, used when composing prompts
    pub fn plain_text(&self) -> String {
        let Some(content) = self.content.as_deref() else {
            return String::new();
        };
        TAG_RE.replace_all(content, " ").split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// A learning objective attached to a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: NodeId,
    pub text: String,
}

/// Textbook metadata for a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfDocument {
    pub id: NodeId,
    pub title: String,
    pub url: String,
    pub subject_id: NodeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(content: Option<&str>) -> Lesson {
        Lesson {
            id: 1,
            title: "الدرس الأول".into(),
            content: content.map(str::to_string),
            objectives: Vec::new(),
        }
    }

    #[test]
    fn null_content_has_no_content() {
        assert!(!lesson(None).has_content());
    }

    #[test]
    fn empty_and_blank_content_has_no_content() {
        assert!(!lesson(Some("")).has_content());
        assert!(!lesson(Some("   \n\t")).has_content());
    }

    #[test]
    fn markup_only_content_has_no_content() {
        assert!(!lesson(Some("<p></p>")).has_content());
        assert!(!lesson(Some("<p>&nbsp;</p><br/>")).has_content());
        assert!(!lesson(Some("<div>\u{a0}</div>")).has_content());
    }

    #[test]
    fn text_inside_markup_is_content() {
        assert!(lesson(Some("<p>hi</p>")).has_content());
        assert!(lesson(Some("أُصَدِّقُ كِتابي")).has_content());
    }

    #[test]
    fn plain_text_strips_tags() {
        let l = lesson(Some("<p>مرحبا</p><ul><li>أولا</li></ul>"));
        assert_eq!(l.plain_text(), "مرحبا أولا");
    }

    #[test]
    fn deserializes_nested_tree() {
        let json = r#"[{
            "id": 1, "name": "الصف الأول",
            "subjects": [{
                "id": 10, "name": "اللغة العربية",
                "units": [{
                    "id": 100, "name": "الوحدة الأولى",
                    "lessons": [{"id": 1000, "title": "أصدق كتابي", "content": null}]
                }]
            }]
        }]"#;

        let grades: Vec<Grade> = serde_json::from_str(json).unwrap();
        let lesson = &grades[0].subjects[0].units[0].lessons[0];
        assert_eq!(lesson.id, 1000);
        assert!(lesson.content.is_none());
        assert!(lesson.objectives.is_empty());
    }

    #[test]
    fn lookups_by_id() {
        let unit = Unit {
            id: 5,
            name: "u".into(),
            lessons: vec![lesson(Some("a")), Lesson { id: 2, ..lesson(None) }],
        };
        assert_eq!(unit.lesson(2).map(|l| l.id), Some(2));
        assert!(unit.lesson(9).is_none());
        assert_eq!(unit.first_lesson().map(|l| l.id), Some(1));
    }

    #[test]
    fn pdf_document_deserializes() {
        let json = r#"{"id":3,"title":"كتاب الطالب","url":"https://example.org/a.pdf","subject_id":10}"#;
        let doc: PdfDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.subject_id, 10);
    }
}
