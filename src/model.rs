//! Core news data types shared by the gateway, pipeline, and storage layers.
//!
//! `Article` serializes with the same field names the news API uses, so the
//! persisted favorites and exported files look like API article objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Publisher of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A single news item, identified by its URL.
///
/// Equality and hashing use only `url`: two values with the same URL are the
/// same article even if the other fields differ (e.g. an edited headline).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    #[serde(default)]
    pub author: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, rename = "urlToImage")]
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    pub fn source_name(&self) -> &str {
        &self.source.name
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// One batch of articles returned by a single gateway call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    /// Total matches reported by the server across all pages.
    pub total_results: u32,
    /// Entries in the raw response, before unusable ones were dropped.
    pub received: usize,
}

#[cfg(test)]
pub(crate) fn test_article(url: &str, title: &str) -> Article {
    use chrono::TimeZone;

    Article {
        source: Source {
            id: None,
            name: "Test Source".to_string(),
        },
        author: None,
        title: title.to_string(),
        description: Some(format!("About {title}")),
        url: url.to_string(),
        image_url: None,
        published_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        content: None,
    }
}
