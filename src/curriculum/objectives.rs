//! Learning objective categorisation
//!
//! Objectives carry no explicit skill field. They are grouped at display time by
//! matching their text against a small keyword table.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::Objective;

/// Skill keywords and their display icons, in match priority order
const SKILLS: &[(&str, &str)] = &[
    ("استماع", "👂"),
    ("تحدث", "🗣️"),
    ("قراءة", "📚"),
    ("كتابة", "✍️"),
    ("قواعد", "📏"),
    ("مفردات", "📝"),
    ("listening", "👂"),
    ("speaking", "🗣️"),
    ("reading", "📚"),
    ("writing", "✍️"),
    ("grammar", "📏"),
    ("vocabulary", "📝"),
];

/// Group name used when no keyword matches
pub const GENERAL_SKILL: &str = "عام";

/// Icon used for the general group
pub const DEFAULT_ICON: &str = "🔹";

/// Splits objective text into individual points: line breaks, `<br>`, bullets,
/// and periods not followed by a digit
static POINT_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n|<br\s*/?>|\u{2022}|\.(?:[^\d]|$)").unwrap());

/// Punctuation accepted as a line terminator
const TERMINATORS: &[char] = &['.', '!', '?', '؟', ':', ';', '،'];

/// Objectives sharing a skill area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillGroup<'a> {
    /// Matched keyword or [`GENERAL_SKILL`]
    pub skill: &'static str,
    pub objectives: Vec<&'a Objective>,
}

impl SkillGroup<'_> {
    /// Display icon for this group
    pub fn icon(&self) -> &'static str {
        icon_for(self.skill)
    }
}

/// Find the skill keyword an objective text belongs to
pub fn skill_of(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    SKILLS
        .iter()
        .map(|(key, _)| *key)
        .find(|key| lower.contains(key))
        .unwrap_or(GENERAL_SKILL)
}

/// Icon for a skill name
pub fn icon_for(skill: &str) -> &'static str {
    let lower = skill.to_lowercase();
    SKILLS.iter().find(|(key, _)| lower.contains(key)).map(|(_, icon)| *icon).unwrap_or(DEFAULT_ICON)
}

/// Group objectives by skill, keeping groups in order of first appearance
pub fn group_by_skill(objectives: &[Objective]) -> Vec<SkillGroup<'_>> {
    let mut groups: Vec<SkillGroup<'_>> = Vec::new();

    for objective in objectives {
        let skill = skill_of(&objective.text);
        match groups.iter_mut().find(|g| g.skill == skill) {
            Some(group) => group.objectives.push(objective),
            None => groups.push(SkillGroup { skill, objectives: vec![objective] }),
        }
    }

    groups
}

/// Remove a leading `"<skill>:"` or `"<skill> -"` label
pub fn clean_text(text: &str) -> &str {
    let lower = text.to_lowercase();
    for (key, _) in SKILLS {
        for suffix in [":", " -"] {
            let label = format!("{key}{suffix}");
            // Keywords are either Arabic or ASCII, so lowercasing keeps byte offsets intact
            if lower.starts_with(&label) {
                return text[label.len()..].trim();
            }
        }
    }
    text
}

/// Split an objective into display points, each ending in punctuation
pub fn split_points(text: &str) -> Vec<String> {
    let mut points = Vec::new();
    let mut last = 0;

    for m in POINT_SPLIT_RE.find_iter(text) {
        // A period split keeps the period and leaves the following char in place
        let (end, next) = if m.as_str().starts_with('.') {
            (m.start() + 1, m.start() + 1)
        } else {
            (m.start(), m.end())
        };
        push_point(&mut points, &text[last..end]);
        last = next;
    }
    push_point(&mut points, &text[last..]);

    points
}

fn push_point(points: &mut Vec<String>, raw: &str) {
    let line = raw.trim();
    if line.is_empty() {
        return;
    }
    let mut line = line.to_string();
    if !line.ends_with(TERMINATORS) {
        line.push('.');
    }
    points.push(line);
}
