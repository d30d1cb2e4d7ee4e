use crate::app::{App, Screen};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if let Some(kind) = app.page.inline_error().filter(|_| app.screen == Screen::Browse) {
        Cow::Owned(format!("{} [r]etry", kind.title()))
    } else {
        hints(app)
    };

    let paragraph = Paragraph::new(text).style(app.theme.status_bar);
    f.render_widget(paragraph, area);
}

fn hints(app: &App) -> Cow<'static, str> {
    if app.overlay.is_some() {
        return Cow::Borrowed("[j/k]field [h/l]change [Enter]apply [x]reset [Esc]close");
    }
    match app.screen {
        Screen::Login => {
            if app.login_pending {
                Cow::Borrowed("Logging in...")
            } else {
                Cow::Borrowed("[Enter]log in [?]help [q]uit")
            }
        }
        Screen::Browse => {
            if app.search_mode {
                Cow::Borrowed("Type to search | ESC clear | ENTER search now")
            } else {
                Cow::Borrowed("[/]search [f]ilters [F]avorites [r]efresh [Enter]open [L]ogout [?]help [q]uit")
            }
        }
        Screen::Detail => Cow::Borrowed("[b]ack [j/k]scroll [s]ave [o]pen [d]ownload [?]help"),
        Screen::Favorites => Cow::Borrowed("[Enter]open [x]remove [o]pen [b]ack [?]help"),
    }
}
