//! Lesson panel: tab strip and the active tab's body

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::layout::{draw_scrollbar, line_text, text_width, wrap_text};
use crate::app::chat::practice_prompts;
use crate::app::navigation::Tab;
use crate::app::state::{AppState, LoadStatus, PdfState};
use crate::curriculum::objectives::{clean_text, group_by_skill, split_points};
use crate::curriculum::{ContentBlock, Lesson, format_content, parse_fragment};
use crate::theme::Theme;

const NO_CONTENT: &str = "لا يوجد محتوى لهذا الدرس";

/// Rendered body of the lesson panel
#[derive(Debug, Default)]
pub struct LessonLines {
    pub lines: Vec<Line<'static>>,
    /// First line of each practice question, by question index
    pub questions: Vec<(usize, usize)>,
}

impl LessonLines {
    fn push(&mut self, line: impl Into<Line<'static>>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    /// Wrapped text, with `prefix` on the first row and matching indent after
    fn push_wrapped(&mut self, prefix: &str, text: &str, style: Style, width: usize) {
        let indent = " ".repeat(text_width(prefix) as usize);
        let rows = wrap_text(text, width.saturating_sub(indent.len()));
        for (i, row) in rows.into_iter().enumerate() {
            let lead = if i == 0 { prefix.to_string() } else { indent.clone() };
            self.push(Line::from(vec![Span::styled(lead, style), Span::styled(row, style)]));
        }
    }

    fn message(&mut self, text: &str, style: Style, width: usize) {
        self.blank();
        self.push_wrapped("  ", text, style, width);
    }
}

/// Draw the lesson panel
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme, focused: bool) {
    let border_color = if focused { theme.border_focused } else { theme.border };
    let title = state
        .navigation
        .current_lesson()
        .map(|l| format!(" {} ", l.title))
        .unwrap_or_else(|| " الدرس ".to_string());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    state.hits.lesson = area;

    if inner.height < 2 || inner.width < 4 {
        state.selection.set_region(Rect::default(), Vec::new());
        return;
    }

    let tabs_area = Rect { height: 1, ..inner };
    draw_tabs(frame, tabs_area, state, theme);

    // Reserve 1 column for scrollbar
    let body = Rect { y: inner.y + 2, height: inner.height.saturating_sub(2), ..inner };
    let content_area = Rect { width: body.width.saturating_sub(1), ..body };
    let scrollbar_x = body.x + body.width.saturating_sub(1);
    let content_width = content_area.width.saturating_sub(1) as usize;

    let rendered = build_lines(state, theme, content_width);
    let total_lines = rendered.lines.len();
    let visible_height = body.height as usize;

    // Update state with content metrics for scroll clamping
    state.lesson_view.total_lines = total_lines;
    state.lesson_view.visible_height = visible_height;
    state.lesson_view.clamp_scroll();
    let scroll_offset = state.lesson_view.scroll_offset;

    let visible_lines: Vec<Line<'static>> =
        rendered.lines.into_iter().skip(scroll_offset).take(visible_height).collect();

    for &(line_index, question) in &rendered.questions {
        if line_index >= scroll_offset && line_index < scroll_offset + visible_lines.len() {
            let y = content_area.y + (line_index - scroll_offset) as u16;
            state.hits.questions.push((question, Rect::new(content_area.x, y, content_area.width, 1)));
        }
    }

    let rows: Vec<String> = visible_lines.iter().map(line_text).collect();
    state.selection.set_region(content_area, rows);

    frame.render_widget(Paragraph::new(visible_lines), content_area);
    draw_scrollbar(frame, scrollbar_x, body.y, body.height, scroll_offset, total_lines, theme);
}

/// Draw the tab strip and record each tab for clicks
fn draw_tabs(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let active = state.navigation.tab();
    let has_content = state.navigation.has_content();

    let mut spans = Vec::new();
    let mut x = area.x;
    for tab in Tab::ALL {
        let label = format!(" {} ", tab.label());
        let width = text_width(&label).min(area.right().saturating_sub(x));

        let style = if tab == active {
            Style::default().fg(theme.bg_primary).bg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else if tab == Tab::Content && !has_content {
            Style::default().fg(theme.fg_muted).add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(theme.fg_secondary).bg(theme.bg_secondary)
        };

        if width > 0 {
            state.hits.tabs.push((tab, Rect::new(x, area.y, width, 1)));
        }
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x = x.saturating_add(width + 1);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Lines for the active tab
pub fn build_lines(state: &AppState, theme: &Theme, width: usize) -> LessonLines {
    let mut out = LessonLines::default();
    let muted = Style::default().fg(theme.fg_muted);

    match &state.nav_status {
        LoadStatus::Loading => {
            out.message(&format!("{} جارٍ تحميل المنهج...", state.spinner.frame()), muted, width);
            return out;
        }
        LoadStatus::Failed(message) => {
            out.message(message, Style::default().fg(theme.error), width);
            out.message("اكتب :reload لإعادة المحاولة", muted, width);
            return out;
        }
        LoadStatus::Ready => {}
    }

    let Some(lesson) = state.navigation.current_lesson() else {
        out.message("اختر درساً من شريط التنقل (1-4)", muted, width);
        return out;
    };

    match state.navigation.tab() {
        Tab::Content => render_content(&mut out, lesson, theme, width),
        Tab::Objectives => render_objectives(&mut out, lesson, theme, width),
        Tab::Questions => {
            render_questions(&mut out, lesson, state.lesson_view.question_index, theme, width)
        }
        Tab::Textbook => render_textbook(&mut out, state, theme, width),
    }
    out
}

fn render_content(out: &mut LessonLines, lesson: &Lesson, theme: &Theme, width: usize) {
    if !lesson.has_content() {
        out.message(NO_CONTENT, Style::default().fg(theme.fg_muted), width);
        return;
    }

    let blocks = parse_fragment(&format_content(lesson.content.as_deref()));
    for block in &blocks {
        render_block(out, block, theme, width);
    }
}

/// Render one content block to styled lines
pub fn render_block(out: &mut LessonLines, block: &ContentBlock, theme: &Theme, width: usize) {
    match block {
        ContentBlock::Heading { level, text } => {
            let style = match level {
                1 => Style::default()
                    .fg(theme.accent_primary)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                2 => Style::default().fg(theme.accent_secondary).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(theme.info).add_modifier(Modifier::BOLD),
            };
            out.blank();
            out.push_wrapped("", text, style, width);
            out.blank();
        }
        ContentBlock::Paragraph(text) => {
            out.push_wrapped("", text, Style::default().fg(theme.fg_primary), width);
            out.blank();
        }
        ContentBlock::List { ordered, items } => {
            let style = Style::default().fg(theme.fg_primary);
            for (i, item) in items.iter().enumerate() {
                let bullet = if *ordered { format!("  {}. ", i + 1) } else { "  • ".to_string() };
                out.push_wrapped(&bullet, item, style, width);
            }
            out.blank();
        }
    }
}

fn render_objectives(out: &mut LessonLines, lesson: &Lesson, theme: &Theme, width: usize) {
    let groups = group_by_skill(&lesson.objectives);
    if groups.is_empty() {
        out.message("لا توجد أهداف تعليمية لهذا الدرس", Style::default().fg(theme.fg_muted), width);
        return;
    }

    let heading = Style::default().fg(theme.accent_secondary).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(theme.fg_primary);
    for group in groups {
        out.blank();
        out.push(Span::styled(format!("{} {}", group.icon(), group.skill), heading));
        for objective in group.objectives {
            for point in split_points(clean_text(&objective.text)) {
                out.push_wrapped("  • ", &point, text, width);
            }
        }
    }
}

fn render_questions(
    out: &mut LessonLines,
    lesson: &Lesson,
    highlighted: usize,
    theme: &Theme,
    width: usize,
) {
    let prompts = practice_prompts(lesson);
    let muted = Style::default().fg(theme.fg_muted);

    out.push_wrapped("", "اختر سؤالاً (Enter أو نقرة) لإرساله إلى المساعد:", muted, width);
    out.blank();

    for (index, prompt) in prompts.iter().enumerate() {
        let style = if index == highlighted {
            Style::default().fg(theme.fg_primary).bg(theme.bg_tertiary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_primary)
        };
        let start = out.lines.len();
        out.push_wrapped(&format!("{}. ", index + 1), prompt, style, width);
        for line_index in start..out.lines.len() {
            out.questions.push((line_index, index));
        }
        out.blank();
    }
}

fn render_textbook(out: &mut LessonLines, state: &AppState, theme: &Theme, width: usize) {
    let muted = Style::default().fg(theme.fg_muted);
    let title = Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD);

    match &state.pdf {
        PdfState::Idle => out.message("لم تُحدد مادة بعد", muted, width),
        PdfState::Loading(_) => {
            out.message(&format!("{} جارٍ تحميل بيانات الكتاب...", state.spinner.frame()), muted, width)
        }
        PdfState::Missing(_) => out.message("لا يتوفر كتاب لهذه المادة", muted, width),
        PdfState::Failed { message, .. } => {
            out.message(message, Style::default().fg(theme.error), width);
            out.message("اكتب :reload لإعادة المحاولة", muted, width);
        }
        PdfState::Ready(doc) | PdfState::Downloading(doc) | PdfState::Downloaded { doc, .. } => {
            out.blank();
            out.push_wrapped("📘 ", &doc.title, title, width);
            out.blank();
            out.push_wrapped("الرابط: ", &doc.url, Style::default().fg(theme.info), width);
            out.blank();

            match &state.pdf {
                PdfState::Downloading(_) => out.push_wrapped(
                    "",
                    &format!("{} جارٍ التنزيل...", state.spinner.frame()),
                    muted,
                    width,
                ),
                PdfState::Downloaded { path, bytes, .. } => {
                    let saved = format!("تم الحفظ في {} ({} كيلوبايت)", path.display(), bytes / 1024);
                    out.push_wrapped("✓ ", &saved, Style::default().fg(theme.success), width);
                }
                _ => out.push_wrapped("", "اضغط Enter أو D لتنزيل الكتاب", muted, width),
            }
        }
    }
}
