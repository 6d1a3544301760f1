//! Markdown rendering for tutor replies
//!
//! Replies use a small Markdown subset: emphasis, inline code, headings,
//! lists, quotes and fenced code. Everything is flattened into styled,
//! pre-wrapped lines for the chat panel.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use textwrap::core::display_width;

use crate::theme::Theme;

/// Render Markdown text into lines no wider than `width` cells
pub fn render_markdown(text: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(theme, width);
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        renderer.event(event);
    }
    renderer.finish()
}

struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    /// Spans of the block being built
    spans: Vec<Span<'static>>,
    /// Inline styles currently open, innermost last
    styles: Vec<Style>,
    /// Open lists; ordered lists carry their next number
    lists: Vec<Option<u64>>,
    /// Marker for the first line of the current list item
    marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            marker: None,
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_else(|| Style::default().fg(self.theme.fg_primary))
    }

    fn push_style(&mut self, style: Style) {
        let combined = self.style().patch(style);
        self.styles.push(combined);
    }

    fn code_style(&self) -> Style {
        Style::default().fg(self.theme.info).bg(self.theme.bg_secondary)
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::from(""));
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                self.flush();
                self.push_style(
                    Style::default().fg(self.theme.accent_primary).add_modifier(Modifier::BOLD),
                );
            }
            Event::End(TagEnd::Heading(_)) => {
                self.styles.pop();
                self.flush();
                self.blank();
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(Style::default().fg(self.theme.fg_secondary));
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush();
                self.styles.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                self.blank();
            }
            Event::Start(Tag::List(first)) => {
                self.flush();
                self.lists.push(first);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                self.marker = Some(match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                });
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::Emphasis) => {
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Event::Start(Tag::Strong) => {
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Event::Start(Tag::Strikethrough) => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            Event::Start(Tag::Link { .. }) => {
                self.push_style(
                    Style::default().fg(self.theme.info).add_modifier(Modifier::UNDERLINED),
                );
            }
            Event::End(
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link,
            ) => {
                self.styles.pop();
            }
            Event::Text(text) if self.in_code_block => self.code_lines(&text),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                let style = self.style();
                self.spans.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                let style = self.code_style();
                self.spans.push(Span::styled(code.into_string(), style));
            }
            Event::SoftBreak => {
                let style = self.style();
                self.spans.push(Span::styled(" ", style));
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let rule = "─".repeat(self.width.clamp(1, 40));
                let style = Style::default().fg(self.theme.border);
                self.lines.push(Line::from(Span::styled(rule, style)));
                self.blank();
            }
            _ => {}
        }
    }

    /// Code is shown verbatim with a gutter, never re-wrapped
    fn code_lines(&mut self, code: &str) {
        let gutter = Style::default().fg(self.theme.border);
        let style = self.code_style();
        for line in code.lines() {
            self.lines.push(Line::from(vec![
                Span::styled("│ ", gutter),
                Span::styled(line.to_string(), style),
            ]));
        }
    }

    /// Wrap the pending spans into lines under the current quote and list prefix
    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);

        let mut prefix = "│ ".repeat(self.quote_depth);
        prefix.push_str(&"  ".repeat(self.lists.len().saturating_sub(1)));
        let marker = self.marker.take().unwrap_or_default();
        let continuation = format!("{prefix}{}", " ".repeat(display_width(&marker)));
        let first = format!("{prefix}{marker}");

        let available = self.width.saturating_sub(display_width(&first)).max(1);
        let prefix_style = Style::default().fg(self.theme.accent_secondary);
        for (i, row) in wrap_spans(spans, available).into_iter().enumerate() {
            let lead = if i == 0 { first.clone() } else { continuation.clone() };
            let mut row_spans = Vec::with_capacity(row.spans.len() + 1);
            if !lead.is_empty() {
                row_spans.push(Span::styled(lead, prefix_style));
            }
            row_spans.extend(row.spans);
            self.lines.push(Line::from(row_spans));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Word-wrap styled spans, keeping each word's style
fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0;

    for span in spans {
        let style = span.style;
        for word in span.content.split_inclusive(char::is_whitespace) {
            let word_width = display_width(word);
            if current_width + display_width(word.trim_end()) > width && current_width > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }
            if current_width == 0 && word.trim().is_empty() {
                continue;
            }
            current.push(Span::styled(word.to_string(), style));
            current_width += word_width;
        }
    }

    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}
