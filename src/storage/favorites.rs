//! Persisted set of favorite articles.
//!
//! The whole collection lives under one key as a JSON array. Every operation
//! reads and rewrites it; there is no locking, so concurrent writers race and
//! the last write wins.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use super::kv::KeyValueStore;
use crate::model::Article;
use crate::util::atomic_write;

pub const FAVORITES_KEY: &str = "favorites";

#[derive(Clone)]
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved articles in insertion order. Storage or decode failures yield an
    /// empty list.
    pub async fn list(&self) -> Vec<Article> {
        match self.load().await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load favorites");
                Vec::new()
            }
        }
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.list().await.iter().any(|a| a.url == url)
    }

    /// Append `article` unless its URL is already saved. Returns `false` only
    /// when the write failed.
    pub async fn add(&self, article: &Article) -> bool {
        let mut articles = match self.load().await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load favorites before add");
                return false;
            }
        };
        if articles.iter().any(|a| a.url == article.url) {
            return true;
        }
        articles.push(article.clone());
        self.save_logged(&articles).await
    }

    /// Remove the article with `url`, if present. Returns `false` only when
    /// the write failed.
    pub async fn remove(&self, url: &str) -> bool {
        let mut articles = match self.load().await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load favorites before remove");
                return false;
            }
        };
        let before = articles.len();
        articles.retain(|a| a.url != url);
        if articles.len() == before {
            return true;
        }
        self.save_logged(&articles).await
    }

    /// Write all favorites to `path` as a pretty-printed JSON array.
    pub async fn export_to(&self, path: &Path) -> Result<usize> {
        let articles = self.load().await?;
        let json = serde_json::to_vec_pretty(&articles).context("Failed to encode favorites")?;
        atomic_write(path, &json)?;
        tracing::info!(count = articles.len(), path = %path.display(), "Exported favorites");
        Ok(articles.len())
    }

    /// Merge the JSON array at `path` into the saved favorites, skipping URLs
    /// already present. Returns how many were added.
    pub async fn import_from(&self, path: &Path) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let incoming: Vec<Article> = serde_json::from_str(&raw)
            .with_context(|| format!("'{}' is not a JSON array of articles", path.display()))?;

        let mut articles = self.load().await?;
        let mut added = 0;
        for article in incoming {
            if !articles.iter().any(|a| a.url == article.url) {
                articles.push(article);
                added += 1;
            }
        }
        if added > 0 {
            self.save(&articles).await?;
        }
        tracing::info!(added, path = %path.display(), "Imported favorites");
        Ok(added)
    }

    async fn load(&self) -> Result<Vec<Article>> {
        match self.store.get(FAVORITES_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).context("Stored favorites are not valid JSON"),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, articles: &[Article]) -> Result<()> {
        let json = serde_json::to_string(articles).context("Failed to encode favorites")?;
        self.store.set(FAVORITES_KEY, &json).await
    }

    async fn save_logged(&self, articles: &[Article]) -> bool {
        match self.save(articles).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save favorites");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_article;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn store() -> FavoritesStore {
        FavoritesStore::new(Arc::new(MemoryStore::new()))
    }

    fn urls(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.url.as_str()).collect()
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
        async fn remove(&self, _key: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let favorites = store();
        assert!(favorites.list().await.is_empty());
        assert!(!favorites.contains("https://a.com").await);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let favorites = store();
        let article = test_article("https://a.com", "A");
        assert!(favorites.add(&article).await);
        assert!(favorites.add(&article).await);
        assert_eq!(favorites.list().await.len(), 1);
        assert!(favorites.contains("https://a.com").await);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores() {
        let favorites = store();
        favorites.add(&test_article("https://a.com", "A")).await;
        let before = favorites.list().await;

        favorites.add(&test_article("https://b.com", "B")).await;
        assert!(favorites.contains("https://b.com").await);
        favorites.remove("https://b.com").await;

        assert_eq!(favorites.list().await, before);
        assert!(!favorites.contains("https://b.com").await);
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let favorites = store();
        favorites.add(&test_article("https://a.com", "A")).await;
        assert!(favorites.remove("https://zzz.com").await);
        assert_eq!(favorites.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_keeps_insertion_order() {
        let favorites = store();
        for url in ["https://c.com", "https://a.com", "https://b.com"] {
            favorites.add(&test_article(url, "T")).await;
        }
        let listed = favorites.list().await;
        assert_eq!(urls(&listed), vec!["https://c.com", "https://a.com", "https://b.com"]);
    }

    #[tokio::test]
    async fn test_storage_failures_are_swallowed() {
        let favorites = FavoritesStore::new(Arc::new(BrokenStore));
        assert!(favorites.list().await.is_empty());
        assert!(!favorites.contains("https://a.com").await);
        assert!(!favorites.add(&test_article("https://a.com", "A")).await);
        assert!(!favorites.remove("https://a.com").await);
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(FAVORITES_KEY, "{not json").await.unwrap();
        let favorites = FavoritesStore::new(kv);
        assert!(favorites.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_export_then_import_merges() {
        let dir = std::env::temp_dir().join(format!("newsdesk_fav_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("favorites.json");

        let source = store();
        source.add(&test_article("https://a.com", "A")).await;
        source.add(&test_article("https://b.com", "B")).await;
        assert_eq!(source.export_to(&file).await.unwrap(), 2);

        let target = store();
        target.add(&test_article("https://b.com", "B")).await;
        target.add(&test_article("https://c.com", "C")).await;
        assert_eq!(target.import_from(&file).await.unwrap(), 1);

        let listed = target.list().await;
        assert_eq!(urls(&listed), vec!["https://b.com", "https://c.com", "https://a.com"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let dir = std::env::temp_dir().join(format!("newsdesk_fav_bad_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("bad.json");
        std::fs::write(&file, r#"{"url": "https://a.com"}"#).unwrap();

        assert!(store().import_from(&file).await.is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
