//! Pagination state machine for the article list.
//!
//! [`reduce`] is pure: it takes the current [`PageState`] and an [`Event`] and
//! returns the next state plus the [`Effect`]s the caller must run. Fetches are
//! tagged with a generation number; responses from an older generation than
//! the state's current one are discarded.

use super::error::ErrorKind;
use crate::filters::FilterOptions;
use crate::model::{Article, ArticlePage};
use std::collections::HashSet;

/// Coarse lifecycle of the list, mostly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Everything the retriever needs to perform one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub page: u32,
    pub query: String,
    pub filters: FilterOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Screen shown for the first time.
    Mount,
    FiltersChanged(FilterOptions),
    /// Query text edited. Does not fetch on its own.
    QueryChanged(String),
    /// Query confirmed (debounce elapsed or Enter pressed).
    SearchSubmitted,
    /// Pull-to-refresh.
    Refresh,
    /// User scrolled near the end of the list.
    LoadMore,
    Retry,
    FetchSucceeded {
        generation: u64,
        page: u32,
        result: ArticlePage,
    },
    FetchFailed {
        generation: u64,
        page: u32,
        kind: ErrorKind,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(FetchRequest),
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Full-screen spinner: first page in flight and nothing to show.
    Loading,
    /// Full-screen error view with tips and a retry action.
    Error(ErrorKind),
    /// The article list. A failed load-more shows inline below it.
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub phase: Phase,
    /// Highest page requested in the current filter session (1-based).
    pub page: u32,
    pub articles: Vec<Article>,
    pub loading: bool,
    /// A refresh is in flight (drives the refresh indicator, not the spinner).
    pub refreshing: bool,
    pub error: Option<ErrorKind>,
    /// Server-provided explanation for the last failure, if any.
    pub error_detail: Option<String>,
    pub query: String,
    pub filters: FilterOptions,
    pub page_size: u32,
    /// Total matches reported by the server, unknown until the first response.
    pub total_results: Option<u32>,
    /// Tag of the newest request; responses with any other tag are stale.
    pub generation: u64,
    /// The last request issued, kept so it can be retried.
    pub last_request: Option<FetchRequest>,
    exhausted: bool,
}

impl PageState {
    pub fn new(filters: FilterOptions, page_size: u32) -> Self {
        Self {
            phase: Phase::Idle,
            page: 1,
            articles: Vec::new(),
            loading: false,
            refreshing: false,
            error: None,
            error_detail: None,
            query: String::new(),
            filters,
            page_size: page_size.max(1),
            total_results: None,
            generation: 0,
            last_request: None,
            exhausted: false,
        }
    }

    /// Whether the server has more pages for the current session.
    pub fn has_more(&self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.total_results {
            Some(total) => u64::from(self.page) * u64::from(self.page_size) < u64::from(total),
            None => false,
        }
    }

    pub fn can_load_more(&self) -> bool {
        !self.loading && self.error.is_none() && !self.articles.is_empty() && self.has_more()
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading && self.last_request.as_ref().is_some_and(|r| r.page > 1)
    }

    pub fn display(&self) -> Display {
        if !self.articles.is_empty() {
            return Display::List;
        }
        match self.error {
            Some(kind) if !self.loading => Display::Error(kind),
            _ => Display::Loading,
        }
    }

    /// Error to show under a non-empty list (failed load-more).
    pub fn inline_error(&self) -> Option<ErrorKind> {
        if self.articles.is_empty() {
            None
        } else {
            self.error
        }
    }

    /// Start a new filter session: clear everything and fetch page 1.
    fn restart(mut self) -> (Self, Vec<Effect>) {
        self.page = 1;
        self.articles.clear();
        self.total_results = None;
        self.exhausted = false;
        self.refreshing = false;
        self.issue(1)
    }

    /// Refetch page 1 of the current session. The list stays visible until
    /// the response replaces it, and stays as-is if the refresh fails.
    fn refresh(mut self) -> (Self, Vec<Effect>) {
        self.refreshing = true;
        self.issue(1)
    }

    /// Fetch `page` under a fresh generation. `self.page` only moves once
    /// the response arrives.
    fn issue(mut self, page: u32) -> (Self, Vec<Effect>) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.error_detail = None;
        self.phase = Phase::Loading;
        let request = FetchRequest {
            generation: self.generation,
            page,
            query: self.query.trim().to_string(),
            filters: self.filters,
        };
        self.last_request = Some(request.clone());
        (self, vec![Effect::Fetch(request)])
    }

    fn append(&mut self, incoming: Vec<Article>) {
        let mut seen: HashSet<String> = self.articles.iter().map(|a| a.url.clone()).collect();
        for article in incoming {
            if seen.insert(article.url.clone()) {
                self.articles.push(article);
            }
        }
    }
}

/// Advance the pagination state machine by one event.
pub fn reduce(state: PageState, event: Event) -> (PageState, Vec<Effect>) {
    let mut state = state;
    match event {
        Event::Mount => state.restart(),

        Event::FiltersChanged(filters) => {
            if filters == state.filters && state.phase != Phase::Idle {
                return (state, Vec::new());
            }
            state.filters = filters;
            state.restart()
        }

        Event::QueryChanged(query) => {
            state.query = query;
            (state, Vec::new())
        }

        Event::SearchSubmitted => state.restart(),

        Event::Refresh => state.refresh(),

        Event::LoadMore => {
            if !state.can_load_more() {
                return (state, Vec::new());
            }
            let next = state.page + 1;
            state.refreshing = false;
            state.issue(next)
        }

        Event::Retry => {
            if state.loading || state.error.is_none() {
                return (state, Vec::new());
            }
            let page = state.last_request.as_ref().map_or(state.page, |r| r.page);
            state.refreshing = false;
            state.issue(page)
        }

        Event::FetchSucceeded {
            generation,
            page,
            result,
        } => {
            if generation != state.generation {
                tracing::debug!(generation, current = state.generation, "Discarding stale page");
                return (state, Vec::new());
            }
            state.loading = false;
            state.refreshing = false;
            state.page = page;
            state.total_results = Some(result.total_results);
            // Only a truly empty response ends the session; entries dropped
            // while decoding do not.
            state.exhausted = result.received == 0;
            if page <= 1 {
                state.articles = Vec::new();
            }
            state.append(result.articles);

            if state.articles.is_empty() && state.has_more() {
                tracing::debug!(page, received = result.received, "Nothing usable yet, fetching next page");
                return state.issue(page + 1);
            }
            if state.articles.is_empty() {
                state.error = Some(ErrorKind::NotFound);
                state.phase = Phase::Failed;
            } else {
                state.error = None;
                state.error_detail = None;
                state.phase = Phase::Loaded;
            }
            (state, Vec::new())
        }

        Event::FetchFailed {
            generation,
            page,
            kind,
            message,
        } => {
            if generation != state.generation {
                tracing::debug!(generation, current = state.generation, "Discarding stale failure");
                return (state, Vec::new());
            }
            tracing::debug!(page, ?kind, "Fetch failed");
            state.loading = false;
            state.refreshing = false;
            state.error = Some(kind);
            state.error_detail = message;
            state.phase = Phase::Failed;
            (state, Vec::new())
        }
    }
}
