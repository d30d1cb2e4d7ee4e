//! Response bodies of the news API and their conversion into domain types.

use crate::model::{Article, ArticlePage, Source};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Placeholder title the API uses for articles that were taken down.
const REMOVED_TITLE: &str = "[Removed]";

/// Successful (or `status: "error"`) response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewsResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<WireArticle>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Article as sent by the API: every field may be null.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireArticle {
    #[serde(default)]
    pub source: WireSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl WireArticle {
    /// Convert into an `Article`, or `None` if the entry is unusable.
    ///
    /// Entries without a URL, title, or parseable timestamp are dropped, as are
    /// removed-article placeholders.
    pub fn into_article(self) -> Option<Article> {
        let url = non_empty(self.url)?;
        let title = non_empty(self.title)?;
        if title == REMOVED_TITLE {
            return None;
        }
        let published_at = DateTime::parse_from_rfc3339(self.published_at.as_deref()?)
            .ok()?
            .with_timezone(&Utc);

        Some(Article {
            source: Source {
                id: self.source.id,
                name: self.source.name.unwrap_or_else(|| "Unknown".to_string()),
            },
            author: non_empty(self.author),
            title,
            description: non_empty(self.description),
            url,
            image_url: non_empty(self.url_to_image),
            published_at,
            content: non_empty(self.content),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NewsResponse {
    pub fn into_page(self) -> ArticlePage {
        let received = self.articles.len();
        let articles: Vec<Article> = self
            .articles
            .into_iter()
            .filter_map(WireArticle::into_article)
            .collect();
        if articles.len() < received {
            tracing::debug!(
                received,
                kept = articles.len(),
                "Dropped unusable articles from response"
            );
        }
        ArticlePage {
            articles,
            total_results: self.total_results,
            received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> NewsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_response_converts() {
        let response = parse(
            r#"{
                "status": "ok",
                "totalResults": 42,
                "articles": [{
                    "source": {"id": "bbc-news", "name": "BBC News"},
                    "author": "Reporter",
                    "title": "Markets rally",
                    "description": "Stocks up",
                    "url": "https://example.com/markets",
                    "urlToImage": "https://example.com/markets.jpg",
                    "publishedAt": "2024-06-15T10:00:00Z",
                    "content": "Full text"
                }]
            }"#,
        );
        let page = response.into_page();
        assert_eq!(page.total_results, 42);
        assert_eq!(page.articles.len(), 1);
        let article = &page.articles[0];
        assert_eq!(article.title, "Markets rally");
        assert_eq!(article.source.id.as_deref(), Some("bbc-news"));
        assert_eq!(article.source_name(), "BBC News");
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/markets.jpg"));
    }

    #[test]
    fn test_drops_unusable_entries() {
        let response = parse(
            r#"{
                "status": "ok",
                "totalResults": 4,
                "articles": [
                    {"source": {"name": "A"}, "title": "[Removed]", "url": "https://removed.com", "publishedAt": "2024-06-15T10:00:00Z"},
                    {"source": {"name": "B"}, "title": "No url", "url": null, "publishedAt": "2024-06-15T10:00:00Z"},
                    {"source": {"name": "C"}, "title": "Bad date", "url": "https://c.com", "publishedAt": "yesterday"},
                    {"source": {"name": "D"}, "title": "Keep", "url": "https://d.com", "publishedAt": "2024-06-15T10:00:00+02:00"}
                ]
            }"#,
        );
        let page = response.into_page();
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.received, 4);
        assert_eq!(page.articles[0].url, "https://d.com");
        assert_eq!(
            page.articles[0].published_at.to_rfc3339(),
            "2024-06-15T08:00:00+00:00"
        );
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let response = parse(
            r#"{"status": "ok", "totalResults": 1, "articles": [
                {"source": {"id": null, "name": null}, "author": "  ", "title": "T",
                 "description": "", "url": "https://t.com", "urlToImage": null,
                 "publishedAt": "2024-06-15T10:00:00Z", "content": null}
            ]}"#,
        );
        let page = response.into_page();
        let article = &page.articles[0];
        assert!(article.author.is_none());
        assert!(article.description.is_none());
        assert_eq!(article.source_name(), "Unknown");
    }

    #[test]
    fn test_error_envelope_parses() {
        let response = parse(
            r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#,
        );
        assert_eq!(response.status, "error");
        assert_eq!(response.code.as_deref(), Some("apiKeyInvalid"));
        assert!(response.articles.is_empty());
    }
}
