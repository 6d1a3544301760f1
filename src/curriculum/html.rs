//! HTML fragment to content blocks
//!
//! The terminal cannot show HTML, so the formatter's output (and lesson bodies
//! that are already markup) is reduced to headings, paragraphs and lists.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Tags and comments
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());

/// Named and numeric character references
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// A renderable block of lesson content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Heading with level 1-6
    Heading { level: u8, text: String },
    /// A paragraph of running text
    Paragraph(String),
    /// A flat list; nested lists are folded into their parent
    List { ordered: bool, items: Vec<String> },
}

impl ContentBlock {
    /// Plain text of the block, used for searching and prompts
    pub fn text(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::Paragraph(text) => text.clone(),
            Self::List { items, .. } => items.join("\n"),
        }
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<ContentBlock>,
    text: String,
    heading: Option<u8>,
    list: Option<(bool, Vec<String>)>,
    list_depth: usize,
}

impl Builder {
    fn take_text(&mut self) -> Option<String> {
        let collapsed = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        self.text.clear();
        (!collapsed.is_empty()).then_some(collapsed)
    }

    /// End the current run of text as a paragraph, heading or list item
    fn flush(&mut self) {
        let Some(text) = self.take_text() else {
            return;
        };
        if let Some((_, items)) = self.list.as_mut() {
            items.push(text);
        } else if let Some(level) = self.heading {
            self.blocks.push(ContentBlock::Heading { level, text });
        } else {
            self.blocks.push(ContentBlock::Paragraph(text));
        }
    }

    fn open_list(&mut self, ordered: bool) {
        self.flush();
        if self.list_depth == 0 {
            self.list = Some((ordered, Vec::new()));
        }
        self.list_depth += 1;
    }

    fn close_list(&mut self) {
        self.flush();
        self.list_depth = self.list_depth.saturating_sub(1);
        if self.list_depth == 0 {
            if let Some((ordered, items)) = self.list.take() {
                if !items.is_empty() {
                    self.blocks.push(ContentBlock::List { ordered, items });
                }
            }
        }
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush();
        if let Some((ordered, items)) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(ContentBlock::List { ordered, items });
            }
        }
        self.blocks
    }
}

/// Parse an HTML fragment into content blocks
pub fn parse_fragment(html: &str) -> Vec<ContentBlock> {
    let mut builder = Builder::default();
    let mut last = 0;
    // Raw text element being skipped, until its closing tag
    let mut raw: Option<String> = None;

    for caps in TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(name) = caps.get(2) else {
            // Comment
            if raw.is_none() {
                builder.text.push_str(&decode_entities(&html[last..whole.start()]));
            }
            last = whole.end();
            continue;
        };
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = name.as_str().to_ascii_lowercase();

        if let Some(skipped) = &raw {
            if closing && *skipped == name {
                raw = None;
                last = whole.end();
            }
            continue;
        }
        builder.text.push_str(&decode_entities(&html[last..whole.start()]));
        last = whole.end();

        match (name.as_str(), closing) {
            ("ul", false) => builder.open_list(false),
            ("ol", false) => builder.open_list(true),
            ("ul" | "ol", true) => builder.close_list(),
            ("li", _) => builder.flush(),
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => {
                builder.flush();
                builder.heading = name[1..].parse().ok();
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => {
                builder.flush();
                builder.heading = None;
            }
            ("p" | "div" | "section" | "article" | "blockquote" | "br" | "tr" | "table", _) => {
                builder.flush();
            }
            ("script" | "style", false) => raw = Some(name.clone()),
            ("script" | "style", true) => {}
            _ => {
                // Inline tags separate words only if the source did
            }
        }
    }
    if raw.is_none() {
        builder.text.push_str(&decode_entities(&html[last..]));
    }

    builder.finish()
}

/// Decode the character references that show up in lesson bodies
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
