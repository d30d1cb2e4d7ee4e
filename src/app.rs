use crate::auth::AuthGate;
use crate::filters::FilterOptions;
use crate::keybindings::KeybindingRegistry;
use crate::model::Article;
use crate::pipeline::{self, reduce, Effect, PageState, Retriever};
use crate::platform::{
    BiometricAvailability, DocumentPicker, FileDownloader, Notification, Notifier, ShareSheet,
};
use crate::storage::{AuthState, FavoritesStore};
use crate::theme::{Palette, ThemeVariant};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Moving the selection this close to the end of the list loads the next page.
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// How long a status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Browse,
    Detail,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    DateRange,
    SortBy,
}

impl FilterField {
    pub fn next(self) -> Self {
        match self {
            FilterField::Category => FilterField::DateRange,
            FilterField::DateRange => FilterField::SortBy,
            FilterField::SortBy => FilterField::Category,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FilterField::Category => FilterField::SortBy,
            FilterField::DateRange => FilterField::Category,
            FilterField::SortBy => FilterField::DateRange,
        }
    }
}

/// Filter picker state: edits a copy, applied only on confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDraft {
    pub options: FilterOptions,
    pub field: FilterField,
}

impl FilterDraft {
    pub fn cycle(&mut self, forward: bool) {
        let o = self.options;
        self.options = match (self.field, forward) {
            (FilterField::Category, true) => o.with_category(o.category.next()),
            (FilterField::Category, false) => o.with_category(o.category.prev()),
            (FilterField::DateRange, true) => o.with_date_range(o.date_range.next()),
            (FilterField::DateRange, false) => o.with_date_range(o.date_range.prev()),
            (FilterField::SortBy, true) => o.with_sort_by(o.sort_by.next()),
            (FilterField::SortBy, false) => o.with_sort_by(o.sort_by.prev()),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Filters(FilterDraft),
    Help,
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// Result of a page fetch, fed back into the reducer.
    Pipeline(pipeline::Event),
    FavoritesLoaded(Vec<Article>),
    FavoriteChanged {
        article: Article,
        saved: bool,
        ok: bool,
    },
    LoginFinished {
        success: bool,
        biometric: bool,
    },
    LoggedOut,
    Reminder(Notification),
    DownloadFinished(Result<PathBuf, String>),
    ShareFinished(Result<(), String>),
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

/// Long-lived collaborators, cloned into background tasks.
#[derive(Clone)]
pub struct Services {
    pub retriever: Retriever,
    pub favorites: FavoritesStore,
    pub auth: AuthGate,
    pub notifier: Arc<dyn Notifier>,
    pub downloader: Arc<dyn FileDownloader>,
    pub share: Arc<dyn ShareSheet>,
    pub picker: Arc<dyn DocumentPicker>,
    pub reminder_delay: Option<Duration>,
}

/// Central application state
pub struct App {
    pub services: Services,
    pub theme_variant: ThemeVariant,
    pub theme: Palette,
    pub keybindings: KeybindingRegistry,
    pub help_scroll: u16,

    pub screen: Screen,
    pub overlay: Option<Overlay>,
    pub biometrics: BiometricAvailability,
    pub auth: AuthState,
    /// A login attempt is in flight.
    pub login_pending: bool,

    pub page: PageState,
    pub selected: usize,
    default_filters: FilterOptions,
    page_size: u32,

    pub search_mode: bool,
    /// Last keystroke time; the query is submitted 300ms after it.
    pub search_debounce: Option<Instant>,

    pub favorites: Vec<Article>,
    favorite_urls: HashSet<String>,
    pub favorites_selected: usize,

    pub detail: Option<Article>,
    detail_return: Screen,
    pub detail_scroll: u16,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,

    /// Fetch tasks still running. Aborted on drop, never on supersede.
    pub fetch_handles: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(services: Services, default_filters: FilterOptions, page_size: u32) -> Self {
        Self {
            services,
            theme_variant: ThemeVariant::Dark,
            theme: Palette::dark(),
            keybindings: KeybindingRegistry::new(),
            help_scroll: 0,
            screen: Screen::Login,
            overlay: None,
            biometrics: BiometricAvailability::UNAVAILABLE,
            auth: AuthState::LOGGED_OUT,
            login_pending: false,
            page: PageState::new(default_filters, page_size),
            selected: 0,
            default_filters,
            page_size,
            search_mode: false,
            search_debounce: None,
            favorites: Vec::new(),
            favorite_urls: HashSet::new(),
            favorites_selected: 0,
            detail: None,
            detail_return: Screen::Browse,
            detail_scroll: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            fetch_handles: Vec::new(),
        }
    }

    /// Feed an event through the page reducer and return the fetches to run.
    pub fn apply(&mut self, event: pipeline::Event) -> Vec<Effect> {
        let state = std::mem::replace(
            &mut self.page,
            PageState::new(self.default_filters, self.page_size),
        );
        let (state, effects) = reduce(state, event);
        self.page = state;
        self.clamp_selection();
        self.needs_redraw = true;
        effects
    }

    pub fn default_filters(&self) -> FilterOptions {
        self.default_filters
    }

    /// Switch to the article list after a successful login.
    pub fn enter_session(&mut self, auth: AuthState) {
        self.auth = auth;
        self.login_pending = false;
        self.screen = Screen::Browse;
        self.needs_redraw = true;
    }

    /// Drop everything that belongs to a logged-in session.
    pub fn end_session(&mut self) {
        for handle in self.fetch_handles.drain(..) {
            handle.abort();
        }
        self.auth = AuthState::LOGGED_OUT;
        self.login_pending = false;
        self.screen = Screen::Login;
        self.overlay = None;
        self.page = PageState::new(self.default_filters, self.page_size);
        self.selected = 0;
        self.search_mode = false;
        self.search_debounce = None;
        self.favorites.clear();
        self.favorite_urls.clear();
        self.favorites_selected = 0;
        self.detail = None;
        self.detail_scroll = 0;
        self.needs_redraw = true;
    }

    pub fn selected_article(&self) -> Option<&Article> {
        match self.screen {
            Screen::Browse => self.page.articles.get(self.selected),
            Screen::Favorites => self.favorites.get(self.favorites_selected),
            Screen::Detail => self.detail.as_ref(),
            Screen::Login => None,
        }
    }

    pub fn nav_up(&mut self) {
        match self.screen {
            Screen::Browse => self.selected = self.selected.saturating_sub(1),
            Screen::Favorites => {
                self.favorites_selected = self.favorites_selected.saturating_sub(1)
            }
            Screen::Detail => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            Screen::Login => {}
        }
    }

    pub fn nav_down(&mut self) {
        match self.screen {
            Screen::Browse => {
                if !self.page.articles.is_empty() {
                    let max_index = self.page.articles.len() - 1;
                    self.selected = self.selected.saturating_add(1).min(max_index);
                }
            }
            Screen::Favorites => {
                if !self.favorites.is_empty() {
                    let max_index = self.favorites.len() - 1;
                    self.favorites_selected =
                        self.favorites_selected.saturating_add(1).min(max_index);
                }
            }
            Screen::Detail => self.detail_scroll = self.detail_scroll.saturating_add(1),
            Screen::Login => {}
        }
    }

    /// Selection is within [`LOAD_MORE_THRESHOLD`] rows of the list end.
    pub fn near_list_end(&self) -> bool {
        let len = self.page.articles.len();
        len > 0 && self.selected + LOAD_MORE_THRESHOLD >= len
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self
            .selected
            .min(self.page.articles.len().saturating_sub(1));
        self.favorites_selected = self
            .favorites_selected
            .min(self.favorites.len().saturating_sub(1));
    }

    pub fn open_detail(&mut self) -> bool {
        let Some(article) = self.selected_article().cloned() else {
            return false;
        };
        self.detail_return = self.screen;
        self.detail = Some(article);
        self.detail_scroll = 0;
        self.screen = Screen::Detail;
        true
    }

    pub fn close_detail(&mut self) {
        self.screen = self.detail_return;
        self.detail = None;
        self.detail_scroll = 0;
    }

    pub fn is_favorite(&self, url: &str) -> bool {
        self.favorite_urls.contains(url)
    }

    pub fn set_favorites(&mut self, favorites: Vec<Article>) {
        self.favorite_urls = favorites.iter().map(|a| a.url.clone()).collect();
        self.favorites = favorites;
        self.clamp_selection();
    }

    /// Mirror a completed add/remove without re-reading storage.
    pub fn record_favorite(&mut self, article: Article, saved: bool) {
        if saved {
            if self.favorite_urls.insert(article.url.clone()) {
                self.favorites.push(article);
            }
        } else if self.favorite_urls.remove(&article.url) {
            self.favorites.retain(|a| a.url != article.url);
        }
        self.clamp_selection();
    }

    pub fn open_filters(&mut self) {
        self.overlay = Some(Overlay::Filters(FilterDraft {
            options: self.page.filters,
            field: FilterField::Category,
        }));
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = variant.palette();
        self.needs_redraw = true;
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn track_fetch(&mut self, handle: JoinHandle<()>) {
        self.fetch_handles.retain(|h| !h.is_finished());
        self.fetch_handles.push(handle);
    }
}

/// Abort in-flight tasks so nothing outlives the event loop.
impl Drop for App {
    fn drop(&mut self) {
        for handle in self.fetch_handles.drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{GatewayError, NewsGateway, SearchFilters};
    use crate::filters::Category;
    use crate::model::{test_article, ArticlePage};
    use crate::pipeline::{Display, Event, FetchRequest};
    use crate::platform::terminal::{NoBiometrics, PathPicker};
    use crate::platform::{PlatformError, ShareRequest};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use tokio::time::{self, Duration};

    pub(crate) struct EmptyGateway;

    #[async_trait]
    impl NewsGateway for EmptyGateway {
        async fn top_headlines(
            &self,
            _query: &str,
            _page: u32,
            _category: Category,
        ) -> Result<ArticlePage, GatewayError> {
            Ok(ArticlePage::default())
        }

        async fn search_everything(
            &self,
            _query: &str,
            _page: u32,
            _filters: &SearchFilters,
        ) -> Result<ArticlePage, GatewayError> {
            Ok(ArticlePage::default())
        }
    }

    pub(crate) struct NullPlatform;

    #[async_trait]
    impl Notifier for NullPlatform {
        async fn schedule(&self, _notification: Notification) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    #[async_trait]
    impl FileDownloader for NullPlatform {
        async fn download(&self, _url: &str, _name: &str) -> Result<PathBuf, PlatformError> {
            Err(PlatformError::Unavailable("Downloads"))
        }
    }

    #[async_trait]
    impl ShareSheet for NullPlatform {
        async fn share(&self, _request: &ShareRequest) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    pub(crate) fn test_services() -> Services {
        let kv = Arc::new(MemoryStore::new());
        Services {
            retriever: Retriever::new(Arc::new(EmptyGateway)),
            favorites: FavoritesStore::new(kv.clone()),
            auth: AuthGate::new(kv, Arc::new(NoBiometrics), Arc::new(NoBiometrics)),
            notifier: Arc::new(NullPlatform),
            downloader: Arc::new(NullPlatform),
            share: Arc::new(NullPlatform),
            picker: Arc::new(PathPicker::new(None)),
            reminder_delay: None,
        }
    }

    pub(crate) fn test_app() -> App {
        let mut app = App::new(test_services(), FilterOptions::default(), 3);
        app.enter_session(AuthState {
            is_authenticated: true,
            biometrics_enabled: false,
        });
        app
    }

    fn fetch_of(effects: &[Effect]) -> FetchRequest {
        match effects {
            [Effect::Fetch(request)] => request.clone(),
            other => panic!("expected one fetch, got {other:?}"),
        }
    }

    /// Mount and deliver `count` articles out of `total`.
    pub(crate) fn loaded_app(count: usize, total: u32) -> App {
        let mut app = test_app();
        let request = fetch_of(&app.apply(Event::Mount));
        app.apply(Event::FetchSucceeded {
            generation: request.generation,
            page: 1,
            result: ArticlePage {
                articles: (0..count)
                    .map(|i| test_article(&format!("https://example.com/{i}"), "Headline"))
                    .collect(),
                total_results: total,
                received: count,
            },
        });
        app
    }

    #[test]
    fn test_starts_on_login() {
        let app = App::new(test_services(), FilterOptions::default(), 20);
        assert_eq!(app.screen, Screen::Login);
        assert!(app.selected_article().is_none());
    }

    #[test]
    fn test_nav_empty_list() {
        let mut app = test_app();
        app.nav_down();
        assert_eq!(app.selected, 0);
        assert!(app.selected_article().is_none());
        assert!(!app.near_list_end());
    }

    #[test]
    fn test_nav_clamps_to_list() {
        let mut app = loaded_app(3, 10);
        for _ in 0..10 {
            app.nav_down();
        }
        assert_eq!(app.selected, 2);
        app.nav_up();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_near_list_end_threshold() {
        let mut app = loaded_app(6, 100);
        // 6 items: index 2 is exactly 3 from the end
        app.selected = 1;
        assert!(!app.near_list_end());
        app.selected = 3;
        assert!(app.near_list_end());
    }

    #[test]
    fn test_filter_reset_clamps_selection() {
        let mut app = loaded_app(3, 10);
        app.selected = 2;
        let filters = app.page.filters.with_category(Category::Health);
        let effects = app.apply(Event::FiltersChanged(filters));
        assert_eq!(effects.len(), 1);
        assert_eq!(app.selected, 0);
        assert_eq!(app.page.display(), Display::Loading);
    }

    #[test]
    fn test_detail_round_trip() {
        let mut app = loaded_app(3, 10);
        app.selected = 1;
        assert!(app.open_detail());
        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(
            app.selected_article().map(|a| a.url.as_str()),
            Some("https://example.com/1")
        );
        app.close_detail();
        assert_eq!(app.screen, Screen::Browse);
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_detail_returns_to_favorites() {
        let mut app = test_app();
        app.set_favorites(vec![test_article("https://fav.com", "Fav")]);
        app.screen = Screen::Favorites;
        assert!(app.open_detail());
        app.close_detail();
        assert_eq!(app.screen, Screen::Favorites);
    }

    #[test]
    fn test_record_favorite() {
        let mut app = test_app();
        let article = test_article("https://a.com", "A");
        app.record_favorite(article.clone(), true);
        app.record_favorite(article.clone(), true);
        assert_eq!(app.favorites.len(), 1);
        assert!(app.is_favorite("https://a.com"));

        app.record_favorite(article, false);
        assert!(app.favorites.is_empty());
        assert!(!app.is_favorite("https://a.com"));
    }

    #[test]
    fn test_end_session_discards_state() {
        let mut app = loaded_app(3, 10);
        app.set_favorites(vec![test_article("https://a.com", "A")]);
        app.search_mode = true;
        app.open_filters();

        app.end_session();

        assert_eq!(app.screen, Screen::Login);
        assert!(app.page.articles.is_empty());
        assert_eq!(app.page.generation, 0);
        assert!(app.favorites.is_empty());
        assert!(app.overlay.is_none());
        assert!(!app.search_mode);
        assert_eq!(app.auth, AuthState::LOGGED_OUT);
    }

    #[test]
    fn test_filter_draft_cycles_selected_field() {
        let mut draft = FilterDraft {
            options: FilterOptions::default(),
            field: FilterField::Category,
        };
        draft.cycle(true);
        assert_eq!(draft.options.category, Category::Business);
        draft.field = draft.field.next();
        draft.cycle(false);
        assert_eq!(draft.options.date_range, crate::filters::DateRange::Month);
        assert_eq!(draft.options.category, Category::Business);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Saved to favorites");
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_status_not_expired_before_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test");
        time::advance(Duration::from_millis(2999)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());
    }
}
