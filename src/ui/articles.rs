use crate::app::App;
use crate::model::Article;
use crate::pipeline::{Display, ErrorKind};
use crate::util::{strip_control_chars, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::render::spinner;

/// Format a publication time relative to `now`.
pub fn format_relative_time(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - published).num_seconds();

    // Future dates (clock skew at the source)
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    published.format("%b %d").to_string()
}

/// One list row: favorite marker, title, then source and age.
pub(super) fn article_row(app: &App, article: &Article, width: u16, selected: bool) -> ListItem<'static> {
    let theme = &app.theme;
    let marker = if app.is_favorite(&article.url) {
        "★ "
    } else {
        "  "
    };
    let meta = format!(
        "  {} · {}",
        strip_control_chars(article.source_name()),
        format_relative_time(article.published_at, Utc::now())
    );

    // Borders + marker + meta
    let budget = (width as usize).saturating_sub(4 + meta.chars().count());
    let title = strip_control_chars(&article.title);
    let title = truncate_to_width(&title, budget).into_owned();

    let title_style = if selected {
        theme.article_selected
    } else {
        theme.article_title
    };
    ListItem::new(Line::from(vec![
        Span::styled(marker, theme.favorite_mark),
        Span::styled(title, title_style),
        Span::styled(meta, theme.article_meta),
    ]))
}

fn header_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled("newsdesk", theme.header),
        Span::styled(format!("  {}", app.page.filters.summary()), theme.article_meta),
    ];
    if app.search_mode {
        spans.push(Span::styled(format!("  Search: {}_", app.page.query), theme.input));
    } else if !app.page.query.trim().is_empty() {
        spans.push(Span::styled(
            format!("  “{}”", app.page.query.trim()),
            theme.article_source,
        ));
    }
    if app.page.refreshing {
        spans.push(Span::styled(format!("  {} Refreshing", spinner(app)), theme.spinner));
    }
    Line::from(spans)
}

/// Render the article list screen
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    f.render_widget(Paragraph::new(header_line(app)), chunks[0]);

    match app.page.display() {
        Display::Loading => render_loading(f, app, chunks[1]),
        Display::Error(kind) => render_error(f, app, kind, chunks[1]),
        Display::List => render_list(f, app, chunks[1]),
    }
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let mut items: Vec<ListItem> = app
        .page
        .articles
        .iter()
        .enumerate()
        .map(|(i, article)| article_row(app, article, area.width, i == app.selected))
        .collect();

    if app.page.is_loading_more() {
        items.push(ListItem::new(Line::from(Span::styled(
            format!("  {} Loading more...", spinner(app)),
            app.theme.spinner,
        ))));
    } else if !app.page.has_more() && app.page.inline_error().is_none() {
        items.push(ListItem::new(Line::from(Span::styled(
            "  End of results",
            app.theme.empty,
        ))));
    }

    let title = match app.page.total_results {
        Some(total) => format!(" Articles ({}/{}) ", app.page.articles.len(), total),
        None => " Articles ".to_string(),
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.panel_border_focused)
            .title(title),
    );
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let y = inner.y + inner.height / 2;
    let line = Rect::new(inner.x, y, inner.width, 1);
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("{} Loading articles...", spinner(app)),
            app.theme.spinner,
        ))
        .alignment(Alignment::Center),
        line,
    );
}

/// Full-screen error with remediation tips and a retry hint.
fn render_error(f: &mut Frame, app: &App, kind: ErrorKind, area: Rect) {
    let theme = &app.theme;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(kind.title(), theme.error_title)),
        Line::from(""),
    ];
    if let Some(detail) = &app.page.error_detail {
        lines.push(Line::from(Span::styled(
            strip_control_chars(detail).into_owned(),
            theme.error_body,
        )));
        lines.push(Line::from(""));
    }
    for tip in kind.tips() {
        lines.push(Line::from(Span::styled(format!("• {}", tip), theme.error_body)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press r to try again", theme.article_meta)));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5m");
        assert_eq!(format_relative_time(now - Duration::hours(3), now), "3h");
        assert_eq!(format_relative_time(now - Duration::days(2), now), "2d");
        assert_eq!(format_relative_time(now - Duration::days(30), now), "May 16");
        assert_eq!(format_relative_time(now + Duration::minutes(5), now), "now");
    }
}
