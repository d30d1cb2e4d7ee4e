use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::{centered, spinner};

/// Render the login screen
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let biometric_line = match (app.biometrics.available, app.biometrics.kind) {
        (true, Some(kind)) => format!("Press b to log in with {}", kind.label()),
        (true, None) => "Press b to log in with biometrics".to_string(),
        (false, _) => "Biometric login is not available on this device".to_string(),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("newsdesk", theme.header)),
        Line::from(""),
        Line::from(Span::styled("Press Enter to log in", theme.detail_body)),
        Line::from(Span::styled(biometric_line, theme.detail_meta)),
        Line::from(""),
    ];
    if app.login_pending {
        lines.push(Line::from(Span::styled(
            format!("{} Logging in...", spinner(app)),
            theme.spinner,
        )));
    }

    let rect = centered(56, 10, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border_focused)
                .title(" Welcome "),
        ),
        rect,
    );
}
