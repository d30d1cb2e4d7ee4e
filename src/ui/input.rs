//! Input handling for the TUI.
//!
//! Keys are resolved to actions through the keybinding registry, using the
//! context of whatever currently has focus: an overlay, the search field, or
//! the active screen.

use crate::app::{App, AppEvent, Overlay, Screen};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::pipeline::Event;
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    dispatch, spawn_download, spawn_favorite_toggle, spawn_favorites_load, spawn_login,
    spawn_logout, spawn_share,
};
use super::Action;

/// Lines moved by page up/down in the detail view.
const PAGE_SCROLL: u16 = 20;

fn screen_context(screen: Screen) -> KbContext {
    match screen {
        Screen::Login => KbContext::Login,
        Screen::Browse => KbContext::Browse,
        Screen::Detail => KbContext::Detail,
        Screen::Favorites => KbContext::Favorites,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.overlay {
        Some(Overlay::Help) => return handle_help_input(app, code),
        Some(Overlay::Filters(_)) => {
            handle_filters_input(app, code, modifiers, event_tx);
            return Action::Continue;
        }
        None => {}
    }

    if app.search_mode {
        handle_search_input(app, code, modifiers, event_tx);
        return Action::Continue;
    }

    let Some(action) =
        app.keybindings
            .action_for_key(code, modifiers, screen_context(app.screen))
    else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::ShowHelp => {
            app.overlay = Some(Overlay::Help);
            app.help_scroll = 0;
        }
        KbAction::CycleTheme => {
            app.set_theme(app.theme_variant.next());
            app.set_status(format!("Theme: {}", app.theme_variant.name()));
        }
        action => match app.screen {
            Screen::Login => handle_login_action(app, action, event_tx),
            Screen::Browse => handle_browse_action(app, action, event_tx),
            Screen::Detail => handle_detail_action(app, action, event_tx),
            Screen::Favorites => handle_favorites_action(app, action, event_tx),
        },
    }
    Action::Continue
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.overlay = None;
            app.help_scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll = app.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_filters_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Filters);
    let defaults = app.default_filters();
    let Some(Overlay::Filters(draft)) = app.overlay.as_mut() else {
        return;
    };

    match action {
        Some(KbAction::NextField) => draft.field = draft.field.next(),
        Some(KbAction::PrevField) => draft.field = draft.field.prev(),
        Some(KbAction::NextValue) => draft.cycle(true),
        Some(KbAction::PrevValue) => draft.cycle(false),
        Some(KbAction::ResetFilters) => draft.options = defaults,
        Some(KbAction::ApplyFilters) => {
            let options = draft.options;
            app.overlay = None;
            tracing::debug!(filters = %options.summary(), "Applying filters");
            dispatch(app, Event::FiltersChanged(options), event_tx);
        }
        Some(KbAction::Back) => app.overlay = None,
        _ => {}
    }
}

/// Handle input in search mode.
///
/// Each edit updates the query immediately and restarts the debounce timer;
/// the tick handler submits it once typing pauses.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Search)
    {
        Some(KbAction::ExitSearch) => {
            app.search_mode = false;
            app.search_debounce = None;
            if !app.page.query.is_empty() {
                dispatch(app, Event::QueryChanged(String::new()), event_tx);
                dispatch(app, Event::SearchSubmitted, event_tx);
            }
            return;
        }
        Some(KbAction::CommitSearch) => {
            // Clear before submitting so the tick handler cannot submit twice.
            app.search_debounce = None;
            app.search_mode = false;
            dispatch(app, Event::SearchSubmitted, event_tx);
            return;
        }
        _ => {}
    }

    let mut query = app.page.query.clone();
    match code {
        KeyCode::Backspace => {
            if query.pop().is_none() {
                return;
            }
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if query.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return;
            }
            query.push(c);
        }
        _ => return,
    }
    dispatch(app, Event::QueryChanged(query), event_tx);
    app.search_debounce = Some(tokio::time::Instant::now());
}

fn handle_login_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::BiometricLogin => {
            if app.biometrics.available {
                spawn_login(app, true, event_tx);
            } else {
                app.set_status("Biometric login is not available on this device");
            }
        }
        KbAction::PlainLogin => spawn_login(app, false, event_tx),
        _ => {}
    }
}

fn handle_browse_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::NavDown => {
            app.nav_down();
            if app.near_list_end() && app.page.can_load_more() {
                tracing::debug!(page = app.page.page + 1, "Loading next page");
                dispatch(app, Event::LoadMore, event_tx);
            }
        }
        KbAction::NavUp => app.nav_up(),
        KbAction::Select => {
            app.open_detail();
        }
        KbAction::Refresh => {
            let event = if app.page.error.is_some() {
                Event::Retry
            } else {
                Event::Refresh
            };
            dispatch(app, event, event_tx);
        }
        KbAction::EnterSearch => {
            app.search_mode = true;
        }
        KbAction::Back => {
            if !app.page.query.is_empty() {
                dispatch(app, Event::QueryChanged(String::new()), event_tx);
                dispatch(app, Event::SearchSubmitted, event_tx);
            }
        }
        KbAction::OpenFilters => app.open_filters(),
        KbAction::ShowFavorites => {
            app.screen = Screen::Favorites;
            app.favorites_selected = 0;
            // Storage may have changed since the last read
            spawn_favorites_load(app, event_tx);
        }
        KbAction::Logout => spawn_logout(app, event_tx),
        _ => {}
    }
}

fn handle_detail_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::ScrollDown => app.nav_down(),
        KbAction::ScrollUp => app.nav_up(),
        KbAction::PageDown => app.detail_scroll = app.detail_scroll.saturating_add(PAGE_SCROLL),
        KbAction::PageUp => app.detail_scroll = app.detail_scroll.saturating_sub(PAGE_SCROLL),
        KbAction::Back => app.close_detail(),
        KbAction::ToggleFavorite => {
            if let Some(article) = app.detail.clone() {
                spawn_favorite_toggle(app, article, event_tx);
            }
        }
        KbAction::Share => {
            if let Some(article) = app.detail.as_ref() {
                spawn_share(app, article, event_tx);
            }
        }
        KbAction::Download => {
            if let Some(article) = app.detail.as_ref() {
                spawn_download(app, article, event_tx);
                app.set_status("Downloading...");
            }
        }
        _ => {}
    }
}

fn handle_favorites_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::Select => {
            app.open_detail();
        }
        KbAction::RemoveFavorite => {
            if let Some(article) = app.selected_article().cloned() {
                spawn_favorite_toggle(app, article, event_tx);
            }
        }
        KbAction::Share => {
            if let Some(article) = app.selected_article() {
                spawn_share(app, article, event_tx);
            }
        }
        KbAction::Back => app.screen = Screen::Browse,
        KbAction::Logout => spawn_logout(app, event_tx),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{loaded_app, test_app, test_services};
    use crate::app::FilterField;
    use crate::filters::{Category, FilterOptions};
    use crate::model::test_article;

    fn press(app: &mut App, c: char, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, KeyCode::Char(c), KeyModifiers::NONE, tx)
    }

    fn key(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx)
    }

    #[tokio::test]
    async fn test_quit() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app();
        assert!(matches!(press(&mut app, 'q', &tx), Action::Quit));
    }

    #[tokio::test]
    async fn test_scrolling_near_end_loads_more() {
        let (tx, _rx) = mpsc::channel(16);
        // page_size 3, 5 of 100 loaded
        let mut app = loaded_app(5, 100);
        press(&mut app, 'j', &tx);
        assert!(!app.page.loading);
        press(&mut app, 'j', &tx);
        assert!(app.page.loading);
        assert_eq!(app.page.last_request.as_ref().map(|r| r.page), Some(2));
        assert!(app.page.is_loading_more());
    }

    #[tokio::test]
    async fn test_no_load_more_when_exhausted() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 3);
        for _ in 0..3 {
            press(&mut app, 'j', &tx);
        }
        assert!(!app.page.loading);
        assert_eq!(app.page.page, 1);
    }

    #[tokio::test]
    async fn test_typing_debounces_search() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 10);
        let generation = app.page.generation;

        press(&mut app, '/', &tx);
        assert!(app.search_mode);
        press(&mut app, 'q', &tx);
        press(&mut app, 'x', &tx);
        key(&mut app, KeyCode::Backspace, &tx);

        assert_eq!(app.page.query, "q");
        assert!(app.search_debounce.is_some());
        assert_eq!(app.page.generation, generation);

        key(&mut app, KeyCode::Enter, &tx);
        assert!(!app.search_mode);
        assert!(app.search_debounce.is_none());
        assert_eq!(app.page.generation, generation + 1);
        assert_eq!(app.page.last_request.as_ref().map(|r| r.query.as_str()), Some("q"));
    }

    #[tokio::test]
    async fn test_escape_clears_search() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 10);
        press(&mut app, '/', &tx);
        press(&mut app, 'a', &tx);
        key(&mut app, KeyCode::Esc, &tx);

        assert!(!app.search_mode);
        assert_eq!(app.page.query, "");
        assert!(app.page.loading);
    }

    #[tokio::test]
    async fn test_search_query_length_cap() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app();
        app.search_mode = true;
        app.page.query = "a".repeat(MAX_SEARCH_QUERY_LENGTH);
        press(&mut app, 'b', &tx);
        assert_eq!(app.page.query.len(), MAX_SEARCH_QUERY_LENGTH);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_filter_overlay_applies_on_enter() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 10);
        let generation = app.page.generation;

        press(&mut app, 'f', &tx);
        press(&mut app, 'l', &tx);
        assert_eq!(app.page.filters.category, Category::All);

        key(&mut app, KeyCode::Enter, &tx);
        assert!(app.overlay.is_none());
        assert_eq!(app.page.filters.category, Category::Business);
        assert_eq!(app.page.generation, generation + 1);
        assert!(app.page.articles.is_empty());
    }

    #[tokio::test]
    async fn test_filter_overlay_escape_discards() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 10);
        press(&mut app, 'f', &tx);
        press(&mut app, 'j', &tx);
        match &app.overlay {
            Some(Overlay::Filters(draft)) => assert_eq!(draft.field, FilterField::DateRange),
            other => panic!("expected filters overlay, got {other:?}"),
        }
        press(&mut app, 'l', &tx);
        key(&mut app, KeyCode::Esc, &tx);
        assert!(app.overlay.is_none());
        assert_eq!(app.page.filters, FilterOptions::default());
    }

    #[tokio::test]
    async fn test_refresh_becomes_retry_after_error() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app();
        dispatch(&mut app, Event::Mount, &tx);
        let request = app.page.last_request.clone().unwrap();
        dispatch(
            &mut app,
            Event::FetchFailed {
                generation: request.generation,
                page: 1,
                kind: crate::pipeline::ErrorKind::Server,
                message: None,
            },
            &tx,
        );

        press(&mut app, 'r', &tx);
        assert!(app.page.loading);
        assert!(!app.page.refreshing);
        assert_eq!(app.page.generation, request.generation + 1);
    }

    #[tokio::test]
    async fn test_login_screen_only_offers_login() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut app = App::new(test_services(), FilterOptions::default(), 20);

        press(&mut app, 'f', &tx);
        assert!(app.overlay.is_none());
        press(&mut app, 'b', &tx);
        assert!(!app.login_pending);

        key(&mut app, KeyCode::Enter, &tx);
        assert!(app.login_pending);
        match rx.recv().await {
            Some(AppEvent::LoginFinished { success, biometric }) => {
                assert!(success);
                assert!(!biometric);
            }
            other => panic!("expected LoginFinished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_detail_and_favorites_navigation() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 10);
        key(&mut app, KeyCode::Enter, &tx);
        assert_eq!(app.screen, Screen::Detail);
        press(&mut app, 'j', &tx);
        assert_eq!(app.detail_scroll, 1);
        press(&mut app, 'b', &tx);
        assert_eq!(app.screen, Screen::Browse);

        app.set_favorites(vec![test_article("https://fav.com", "Fav")]);
        press(&mut app, 'F', &tx);
        assert_eq!(app.screen, Screen::Favorites);
        key(&mut app, KeyCode::Esc, &tx);
        assert_eq!(app.screen, Screen::Browse);
    }

    #[tokio::test]
    async fn test_opening_favorites_rereads_storage() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut app = loaded_app(3, 10);
        assert!(app.favorites.is_empty());

        // Saved behind the app's back, e.g. by an import
        app.services
            .favorites
            .add(&test_article("https://fav.com", "Fav"))
            .await;

        press(&mut app, 'F', &tx);
        assert_eq!(app.screen, Screen::Favorites);
        match rx.recv().await {
            Some(AppEvent::FavoritesLoaded(favorites)) => {
                assert_eq!(favorites.len(), 1);
                assert_eq!(favorites[0].url, "https://fav.com");
            }
            other => panic!("expected FavoritesLoaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app();
        press(&mut app, '?', &tx);
        assert_eq!(app.overlay, Some(Overlay::Help));
        assert!(matches!(press(&mut app, 'q', &tx), Action::Continue));
        assert!(app.overlay.is_none());
    }
}
