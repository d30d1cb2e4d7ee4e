use crate::app::App;
use crate::ui::articles::format_relative_time;
use crate::util::{strip_control_chars, trim_truncation_marker};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the article detail view
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let theme = &app.theme;

    let Some(article) = app.detail.as_ref() else {
        let paragraph = Paragraph::new("No article selected")
            .block(Block::default().borders(Borders::ALL).title(" Article "));
        f.render_widget(paragraph, area);
        return;
    };

    let mut meta = vec![strip_control_chars(article.source_name()).into_owned()];
    if let Some(author) = article.author.as_deref().filter(|a| !a.trim().is_empty()) {
        meta.push(strip_control_chars(author).into_owned());
    }
    meta.push(format_relative_time(article.published_at, Utc::now()));

    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&article.title).into_owned(),
            theme.detail_heading,
        )),
        Line::from(Span::styled(meta.join(" • "), theme.detail_meta)),
    ];
    if app.is_favorite(&article.url) {
        lines.push(Line::from(Span::styled("★ Saved", theme.favorite_mark)));
    }
    lines.push(Line::from(""));

    if let Some(description) = article.description.as_deref().filter(|d| !d.trim().is_empty()) {
        push_paragraph(&mut lines, description, theme.detail_body);
    }
    if let Some(content) = article.content.as_deref() {
        let content = trim_truncation_marker(content);
        if !content.trim().is_empty() && Some(content) != article.description.as_deref() {
            push_paragraph(&mut lines, content, theme.detail_body);
        }
    }

    lines.push(Line::from(Span::styled(
        strip_control_chars(&article.url).into_owned(),
        theme.detail_link,
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border_focused)
                .title(" Article "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    f.render_widget(paragraph, area);
}

fn push_paragraph(lines: &mut Vec<Line<'static>>, text: &str, style: ratatui::style::Style) {
    for line in text.lines() {
        lines.push(Line::from(Span::styled(
            strip_control_chars(line).into_owned(),
            style,
        )));
    }
    lines.push(Line::from(""));
}
