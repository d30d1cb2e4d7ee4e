use super::wire::{ErrorBody, NewsResponse};
use crate::filters::{Category, DateBounds, SortBy};
use crate::model::ArticlePage;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::StreamExt;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Headlines are always requested in English.
const LANGUAGE: &str = "en";

/// The search endpoint rejects an empty `q`; this term stands in for "anything".
const FALLBACK_SEARCH_TERM: &str = "news";

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, message: Option<String> },
    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },
    #[error("Invalid response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    #[error("No API key configured (set NEWSAPI_KEY or api_key in config.toml)")]
    MissingApiKey,
}

impl GatewayError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::HttpStatus { status, .. } => Some(*status),
            GatewayError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request never completed: no route, refused connection, or timeout.
    pub fn is_connectivity(&self) -> bool {
        match self {
            GatewayError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Server-provided explanation, when the error body carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::HttpStatus { message, .. } => message.as_deref(),
            GatewayError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Optional constraints for the search endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort_by: SortBy,
}

impl SearchFilters {
    pub fn new(bounds: Option<DateBounds>, sort_by: SortBy) -> Self {
        Self {
            from: bounds.map(|b| b.from),
            to: bounds.map(|b| b.to),
            sort_by,
        }
    }
}

/// Read access to the remote news service.
///
/// Both calls fail on transport errors and non-2xx responses. Neither retries;
/// the caller decides what a failure means.
#[async_trait]
pub trait NewsGateway: Send + Sync {
    /// Country/category-scoped headlines, or a free-text headline search when
    /// `query` is non-empty (country and category are then dropped).
    async fn top_headlines(
        &self,
        query: &str,
        page: u32,
        category: Category,
    ) -> Result<ArticlePage, GatewayError>;

    /// Full-archive search. An empty `query` searches for a generic term.
    async fn search_everything(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<ArticlePage, GatewayError>;
}

/// Connection settings for [`NewsClient`].
///
/// Custom Debug masks the API key.
pub struct ClientOptions {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub country: String,
    pub page_size: u32,
    /// Transport-level timeout for a whole request.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            country: DEFAULT_COUNTRY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("country", &self.country)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Limit redirects to 3 hops and reject loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }
        attempt.follow()
    })
}

/// HTTP implementation of [`NewsGateway`] for NewsAPI-compatible services.
#[derive(Debug)]
pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    country: String,
    page_size: u32,
}

impl NewsClient {
    /// Build a client.
    ///
    /// The base URL must be HTTPS; plain HTTP is accepted only for
    /// `localhost`/`127.0.0.1` so tests can run against a local mock server.
    pub fn new(options: ClientOptions) -> Result<Self, GatewayError> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        if !base_url.starts_with("https://") {
            let is_localhost = base_url.starts_with("http://127.0.0.1")
                || base_url.starts_with("http://localhost");
            if !is_localhost {
                tracing::error!(base_url = %base_url, "Rejecting non-HTTPS news API base URL");
                return Err(GatewayError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base_url, "Using non-HTTPS news API base URL (localhost only)");
        }

        let client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: options.api_key,
            country: options.country,
            page_size: options.page_size.max(1),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_page(
        &self,
        endpoint: &'static str,
        params: Vec<(&'static str, String)>,
    ) -> Result<ArticlePage, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or(GatewayError::MissingApiKey)?;

        let mut url = Url::parse(&format!("{}/{}", self.base_url, endpoint))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apiKey", api_key.expose_secret());
            for (name, value) in &params {
                pairs.append_pair(name, value);
            }
        }

        // `params` never contains the key, so it is safe to log as-is.
        tracing::debug!(endpoint, ?params, "Requesting news page");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = read_limited(response, MAX_RESPONSE_SIZE)
                .await
                .unwrap_or_default();
            let error_body = serde_json::from_slice::<ErrorBody>(&body).ok();
            let code = error_body.as_ref().and_then(|b| b.code.clone());
            let message = error_body.and_then(|b| b.message);
            tracing::warn!(
                endpoint,
                status = status.as_u16(),
                code = code.as_deref().unwrap_or(""),
                "News API returned error status"
            );
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = read_limited(response, MAX_RESPONSE_SIZE).await?;
        let parsed: NewsResponse = serde_json::from_slice(&body)?;

        if parsed.status != "ok" {
            return Err(GatewayError::Api {
                code: parsed.code.unwrap_or_else(|| "unknown".to_string()),
                message: parsed
                    .message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            });
        }

        let page = parsed.into_page();
        tracing::debug!(
            endpoint,
            articles = page.articles.len(),
            total = page.total_results,
            "Received news page"
        );
        Ok(page)
    }
}

#[async_trait]
impl NewsGateway for NewsClient {
    async fn top_headlines(
        &self,
        query: &str,
        page: u32,
        category: Category,
    ) -> Result<ArticlePage, GatewayError> {
        let mut params = vec![
            ("pageSize", self.page_size.to_string()),
            ("page", page.to_string()),
            ("language", LANGUAGE.to_string()),
        ];
        let query = query.trim();
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        } else {
            params.push(("country", self.country.clone()));
            if let Some(category) = category.as_param() {
                params.push(("category", category.to_string()));
            }
        }
        self.get_page("top-headlines", params).await
    }

    async fn search_everything(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<ArticlePage, GatewayError> {
        let query = query.trim();
        let query = if query.is_empty() {
            FALLBACK_SEARCH_TERM
        } else {
            query
        };
        let mut params = vec![
            ("q", query.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("page", page.to_string()),
            ("sortBy", filters.sort_by.as_param().to_string()),
        ];
        if let Some(from) = filters.from {
            params.push(("from", from.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(to) = filters.to {
            params.push(("to", to.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        self.get_page("everything", params).await
    }
}

async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, GatewayError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(GatewayError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(GatewayError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
