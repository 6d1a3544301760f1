//! Navigation bar: one picker per curriculum level

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::layout::text_width;
use crate::app::navigation::{Level, NavigationState};
use crate::app::state::{AppState, LoadStatus, Overlay};
use crate::theme::Theme;

const SEPARATOR: &str = " › ";

/// Text of a level segment, e.g. `الصف: الأول ▾`
pub fn segment_label(navigation: &NavigationState, level: Level) -> String {
    let name = match level {
        Level::Grade => navigation.current_grade().map(|g| g.name.as_str()),
        Level::Subject => navigation.current_subject().map(|s| s.name.as_str()),
        Level::Unit => navigation.current_unit().map(|u| u.name.as_str()),
        Level::Lesson => navigation.current_lesson().map(|l| l.title.as_str()),
    };
    format!("{}: {} ▾", level.label(), name.unwrap_or("—"))
}

/// Draw the navigation bar and record each segment for clicks
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let block = Block::default()
        .title(" دَرْس ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.nav_status {
        LoadStatus::Loading => {
            let msg = format!("{} جارٍ تحميل المنهج...", state.spinner.frame());
            frame.render_widget(Paragraph::new(msg).style(Style::default().fg(theme.fg_muted)), inner);
            return;
        }
        LoadStatus::Failed(message) => {
            let line = Line::from(vec![
                Span::styled(message.clone(), Style::default().fg(theme.error)),
                Span::styled("  (:reload لإعادة المحاولة)", Style::default().fg(theme.fg_muted)),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
            return;
        }
        LoadStatus::Ready => {}
    }

    let open = match state.overlay {
        Overlay::Dropdown(dropdown) => Some(dropdown.level),
        _ => None,
    };

    let mut spans = Vec::new();
    let mut x = inner.x;
    for (i, level) in Level::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(SEPARATOR, Style::default().fg(theme.fg_muted)));
            x = x.saturating_add(text_width(SEPARATOR));
        }

        let label = segment_label(&state.navigation, level);
        let width = text_width(&label).min(inner.right().saturating_sub(x));
        let style = if open == Some(level) {
            Style::default().fg(theme.bg_primary).bg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else if state.navigation.options(level).is_empty() {
            Style::default().fg(theme.fg_muted)
        } else {
            Style::default().fg(theme.fg_primary)
        };

        if width > 0 {
            state.hits.nav.push((level, Rect::new(x, inner.y, width, 1)));
        }
        spans.push(Span::styled(label, style));
        x = x.saturating_add(width);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{Grade, Lesson, Subject, Unit};
    use pretty_assertions::assert_eq;

    #[test]
    fn segment_shows_current_name() {
        let tree = vec![Grade {
            id: 1,
            name: "الصف الأول".into(),
            subjects: vec![Subject {
                id: 2,
                name: "لغتي".into(),
                units: vec![Unit {
                    id: 3,
                    name: "الوحدة الأولى".into(),
                    lessons: vec![Lesson {
                        id: 4,
                        title: "الحروف".into(),
                        content: None,
                        objectives: Vec::new(),
                    }],
                }],
            }],
        }];
        let navigation = NavigationState::load(tree);

        assert_eq!(segment_label(&navigation, Level::Subject), "المادة: لغتي ▾");
        assert_eq!(segment_label(&navigation, Level::Lesson), "الدرس: الحروف ▾");
    }

    #[test]
    fn segment_without_tree_shows_placeholder() {
        let navigation = NavigationState::default();
        assert_eq!(segment_label(&navigation, Level::Grade), "الصف: — ▾");
    }
}
