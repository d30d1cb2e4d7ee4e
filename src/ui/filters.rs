use crate::app::{App, FilterDraft, FilterField};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered;

const FIELDS: [FilterField; 3] = [FilterField::Category, FilterField::DateRange, FilterField::SortBy];

/// Render the filter editor overlay
pub fn render(f: &mut Frame, app: &App, draft: &FilterDraft) {
    let theme = &app.theme;
    let rect = centered(44, 9, f.area());
    if rect.width < 20 || rect.height < 5 {
        return;
    }
    f.render_widget(Clear, rect);

    let mut lines = vec![Line::from("")];
    for field in FIELDS {
        let (label, value) = match field {
            FilterField::Category => ("Category", draft.options.category.label()),
            FilterField::DateRange => ("Date", draft.options.date_range.label()),
            FilterField::SortBy => ("Sort by", draft.options.sort_by.label()),
        };
        let (marker, style) = if field == draft.field {
            ("> ", theme.article_selected)
        } else {
            ("  ", theme.detail_body)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{label:<10}"), style),
            Span::styled(format!("‹ {value} ›"), style),
        ]));
    }
    lines.push(Line::from(""));
    let uses_search = draft.options.needs_search() || !app.page.query.trim().is_empty();
    if !uses_search && draft.options.sort_by != Default::default() {
        lines.push(Line::from(Span::styled(
            "  Sorting applies to searches only",
            theme.detail_meta,
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border_focused)
                .title(" Filters "),
        ),
        rect,
    );
}
