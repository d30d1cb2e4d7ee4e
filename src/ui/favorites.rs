use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::articles::article_row;

/// Render the saved articles screen
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_focused)
        .title(format!(" Favorites ({}) ", app.favorites.len()));

    if app.favorites.is_empty() {
        let paragraph = Paragraph::new("\nNo favorites yet.\nPress s on an article to save it.")
            .style(app.theme.empty)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .favorites
        .iter()
        .enumerate()
        .map(|(i, article)| article_row(app, article, area.width, i == app.favorites_selected))
        .collect();

    let mut state = ListState::default().with_selected(Some(app.favorites_selected));
    f.render_stateful_widget(List::new(items).block(block), area, &mut state);
}
