//! Lesson content formatter
//!
//! Lesson bodies arrive either as HTML fragments or as plain text typed by
//! teachers, often enumerated with Arabic letters or Arabic-Indic digits.
//! This module normalises both into a small HTML fragment made only of
//! paragraphs and unordered lists.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Plain lines longer than this (in chars) are split into sentences
pub const LONG_LINE_THRESHOLD: usize = 100;

const PARAGRAPH_OPEN: &str = r#"<p class="lesson-paragraph">"#;
const LIST_OPEN: &str = r#"<ul class="lesson-list">"#;
const ITEM_OPEN: &str = r#"<li class="lesson-item">"#;

/// Shown in place of the content when formatting fails
pub const FORMAT_ERROR_HTML: &str = r#"<p class="lesson-error">تعذر تنسيق محتوى الدرس</p>"#;

/// Explicit line breaks in plain text
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|<br\s*/?>").unwrap());

/// Leading list markers: symbols, ASCII or Arabic-Indic numbering, or a
/// single Arabic letter followed by `.` or `)`
static BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-•*●○◦‣]|[0-9]+[.)]|[\x{0660}-\x{0669}]+[.)]|[أابتثجحخدذرزسشصضطظعغفقكلمنهوي][.)])",
    )
    .unwrap()
});

/// Sentence-ending punctuation followed by whitespace
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?؟:;،؛]\s+").unwrap());

static LIST_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<ul[\s>]").unwrap());
static ITEM_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<li[\s>]").unwrap());

/// Errors detected while formatting
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The generated fragment left a list open
    #[error("unbalanced list markup: {opened} opened, {closed} closed")]
    UnbalancedList { opened: usize, closed: usize },
}

/// Format raw lesson content into display HTML.
///
/// Never fails: errors are logged and replaced by an inline message.
pub fn format_content(raw: Option<&str>) -> String {
    match try_format(raw) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!("Error formatting content: {}", e);
            FORMAT_ERROR_HTML.to_string()
        }
    }
}

/// Format raw lesson content, reporting structural failures
pub fn try_format(raw: Option<&str>) -> Result<String, FormatError> {
    let Some(raw) = raw else {
        return Ok(String::new());
    };
    let content = raw.trim();
    if content.is_empty() {
        return Ok(String::new());
    }

    tracing::debug!("Formatting content: {}...", content.chars().take(50).collect::<String>());

    if content.contains('<') && content.contains('>') {
        return Ok(normalize_markup(content));
    }

    let html = format_plain_text(content);
    check_lists(&html)?;
    Ok(html)
}

/// Whether a trimmed line starts with a list marker
pub fn is_bullet(line: &str) -> bool {
    BULLET_RE.is_match(line)
}

/// Add spacing classes to bare tags and close lists left open
fn normalize_markup(content: &str) -> String {
    let mut html = content
        .replace("<li>", ITEM_OPEN)
        .replace("<p>", PARAGRAPH_OPEN);

    let missing_items =
        ITEM_OPEN_RE.find_iter(&html).count().saturating_sub(html.matches("</li>").count());
    let missing_lists =
        LIST_OPEN_RE.find_iter(&html).count().saturating_sub(html.matches("</ul>").count());

    if missing_items > 0 || missing_lists > 0 {
        tracing::debug!("Closing {} item(s) and {} list(s)", missing_items, missing_lists);
    }
    html.push_str(&"</li>".repeat(missing_items));
    html.push_str(&"</ul>".repeat(missing_lists));
    html
}

fn format_plain_text(content: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in LINE_BREAK_RE.split(content) {
        let line = line.trim();

        if line.is_empty() {
            close_list(&mut parts, &mut in_list);
            continue;
        }

        if let Some(marker) = BULLET_RE.find(line) {
            if !in_list {
                parts.push(LIST_OPEN.to_string());
                in_list = true;
            }
            let item = line[marker.end()..].trim();
            parts.push(format!("{ITEM_OPEN}{item}</li>"));
            continue;
        }

        close_list(&mut parts, &mut in_list);

        if line.chars().count() > LONG_LINE_THRESHOLD {
            for sentence in split_sentences(line) {
                parts.push(format!("{PARAGRAPH_OPEN}{sentence}</p>"));
            }
        } else {
            parts.push(format!("{PARAGRAPH_OPEN}{line}</p>"));
        }
    }

    close_list(&mut parts, &mut in_list);
    parts.concat()
}

fn close_list(parts: &mut Vec<String>, in_list: &mut bool) {
    if *in_list {
        parts.push("</ul>".to_string());
        *in_list = false;
    }
}

/// Split a long line after sentence punctuation, keeping the punctuation
fn split_sentences(line: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END_RE.find_iter(line) {
        let punct_len = m.as_str().chars().next().map(char::len_utf8).unwrap_or(0);
        let sentence = line[start..m.start() + punct_len].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }

    let rest = line[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

fn check_lists(html: &str) -> Result<(), FormatError> {
    let opened = LIST_OPEN_RE.find_iter(html).count();
    let closed = html.matches("</ul>").count();
    if opened == closed {
        Ok(())
    } else {
        Err(FormatError::UnbalancedList { opened, closed })
    }
}
