//! Floating panels: level dropdown, preset prompts and help

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::layout::{centered_rect, text_width};
use crate::app::chat::PRESET_PROMPTS;
use crate::app::state::{AppState, DropdownState, Overlay};
use crate::theme::Theme;

/// Most rows a dropdown shows at once
const DROPDOWN_MAX_ROWS: u16 = 12;

/// Draw whichever overlay is open
pub fn draw(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    match state.overlay {
        Overlay::None => {}
        Overlay::Help => draw_help(frame, theme),
        Overlay::Presets { highlighted } => draw_presets(frame, state, highlighted, theme),
        Overlay::Dropdown(dropdown) => draw_dropdown(frame, state, dropdown, theme),
    }
}

/// First visible row so that `highlighted` stays inside a window of `rows`
fn window_start(highlighted: usize, count: usize, rows: usize) -> usize {
    if count <= rows {
        0
    } else {
        highlighted.saturating_sub(rows - 1).min(count - rows)
    }
}

fn draw_dropdown(frame: &mut Frame, state: &mut AppState, dropdown: DropdownState, theme: &Theme) {
    let screen = frame.area();
    let Some(anchor) =
        state.hits.nav.iter().find(|(level, _)| *level == dropdown.level).map(|(_, r)| *r)
    else {
        return;
    };

    let options = state.navigation.options(dropdown.level);
    let names: Vec<String> = options.iter().map(|o| o.name.to_string()).collect();
    let widest = names.iter().map(|n| text_width(n)).max().unwrap_or(0);
    let width = (widest + 4).max(anchor.width).max(16).min(screen.width);
    let rows = (names.len() as u16).clamp(1, DROPDOWN_MAX_ROWS);
    let height = (rows + 2).min(screen.bottom().saturating_sub(anchor.bottom()));
    if height < 3 {
        return;
    }

    let x = anchor.x.min(screen.right().saturating_sub(width));
    let area = Rect::new(x, anchor.bottom(), width, height);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", dropdown.level.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if names.is_empty() {
        let empty = Paragraph::new("لا توجد خيارات").style(Style::default().fg(theme.fg_muted));
        frame.render_widget(empty, inner);
        return;
    }

    let current = state.navigation.selection().id(dropdown.level);
    let start = window_start(dropdown.highlighted, names.len(), inner.height as usize);
    let mut hits = Vec::new();

    for (row, index) in (start..names.len()).take(inner.height as usize).enumerate() {
        let rect = Rect::new(inner.x, inner.y + row as u16, inner.width, 1);
        let marker = if Some(options[index].id) == current { "● " } else { "  " };
        let style = if index == dropdown.highlighted {
            Style::default().fg(theme.bg_primary).bg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_primary)
        };
        frame.render_widget(Paragraph::new(format!("{marker}{}", names[index])).style(style), rect);
        hits.push((index, rect));
    }

    state.hits.dropdown = hits;
}

fn draw_presets(frame: &mut Frame, state: &mut AppState, highlighted: usize, theme: &Theme) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" أسئلة مقترحة ")
        .title_bottom(Line::from(" [j/k] تنقل  [Enter] اختيار  [Esc] إغلاق ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Two rows per preset: label then description
    let mut hits = Vec::new();
    for (index, preset) in PRESET_PROMPTS.iter().enumerate() {
        let y = inner.y + (index as u16) * 2;
        if y + 1 >= inner.bottom() {
            break;
        }
        let rect = Rect::new(inner.x, y, inner.width, 2);

        let star = if preset.highlighted { "★ " } else { "  " };
        let label_style = if index == highlighted {
            Style::default().fg(theme.bg_primary).bg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD)
        };
        let lines = vec![
            Line::from(vec![
                Span::styled(star, Style::default().fg(theme.warning)),
                Span::styled(format!("{}. {}", index + 1, preset.label), label_style),
            ]),
            Line::from(Span::styled(
                format!("     {}", preset.description),
                Style::default().fg(theme.fg_muted),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), rect);
        hits.push((index, rect));
    }

    state.hits.presets = hits;
}

fn draw_help(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let key = Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(theme.fg_secondary);
    let heading = Style::default().fg(theme.accent_secondary).add_modifier(Modifier::BOLD);

    let section = |title: &'static str| Line::from(Span::styled(title, heading));
    let row = |keys: &'static str, what: &'static str| {
        Line::from(vec![Span::styled(format!("  {keys:<12}"), key), Span::styled(what, text)])
    };

    let lines = vec![
        section("التنقل"),
        row("1 2 3 4", "اختيار الصف / المادة / الوحدة / الدرس"),
        row("h / l", "الدرس السابق / التالي"),
        row("[ / ]", "التبويب السابق / التالي"),
        row("j k g G", "تمرير المحتوى"),
        row("Ctrl-d/u", "نصف صفحة"),
        row("< / >", "تضييق / توسيع لوحة الدرس"),
        Line::from(""),
        section("المساعد"),
        row("i / Tab", "الكتابة في صندوق المحادثة"),
        row("p", "الأسئلة المقترحة"),
        row("Enter", "إرسال (أو اختيار السؤال في تبويب الأسئلة)"),
        row("Esc", "مغادرة صندوق المحادثة"),
        row("Ctrl-x", "إيقاف الرد الجاري"),
        Line::from(""),
        section("تحديد النص"),
        row("سحب بالفأرة", "حدد نصاً من الدرس لتظهر أزرار الإجراءات"),
        row("1-7", "تشغيل زر من الأزرار أثناء التحديد"),
        Line::from(""),
        section("الأوامر"),
        row(":lesson 12", "الانتقال إلى درس برقمه"),
        row(":tab pdf", "فتح تبويب"),
        row(":ask ...", "إرسال سؤال مباشرة"),
        row(":pdf", "تنزيل كتاب المادة"),
        row(":reload", "إعادة تحميل المنهج"),
        row(":clear", "محادثة جديدة"),
        row(":q", "خروج"),
    ];

    let block = Block::default()
        .title(" المساعدة ")
        .title_bottom(Line::from(" [Esc] إغلاق ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
