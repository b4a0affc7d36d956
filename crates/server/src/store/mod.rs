//! Persistence of saved articles.
//!
//! Records are keyed by URL: [`RecordStore::upsert`] replaces whatever was
//! saved for the same URL before, keeping its id. Two backends ship with the
//! server: [`MemoryStore`] and [`PostgresStore`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use lumpy_core::ArticleRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// A saved article with its bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArticle {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: ArticleRecord,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
    pub read_status: bool,
}

/// List view of a [`StoredArticle`]; everything but `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub site_name: String,
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
    pub read_status: bool,
}

impl From<StoredArticle> for ArticleSummary {
    fn from(article: StoredArticle) -> Self {
        let ArticleRecord { url, title, excerpt, author, site_name, image_url, .. } = article.record;
        Self {
            id: article.id,
            url,
            title,
            excerpt,
            author,
            site_name,
            image_url,
            saved_at: article.saved_at,
            read_status: article.read_status,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not create connection pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("could not get a connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("store is closed")]
    Closed,
}

/// Storage backend for saved articles.
///
/// Implementations serialize writes for the same URL; concurrent upserts of
/// one URL end with the last writer's record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts `record`, or replaces the record saved under the same URL.
    ///
    /// A replaced record keeps its id, gets a fresh `saved_at` and has its
    /// read status reset.
    async fn upsert(&self, record: ArticleRecord) -> Result<StoredArticle, StoreError>;

    /// Newest first.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ArticleSummary>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredArticle>, StoreError>;

    /// Returns `false` when no article has this id.
    async fn set_read_status(&self, id: Uuid, read: bool) -> Result<bool, StoreError>;

    /// Returns `false` when no article has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Releases the backend's resources. Later calls fail with
    /// [`StoreError::Closed`] or a pool error.
    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> StoredArticle {
        StoredArticle {
            id: Uuid::nil(),
            record: ArticleRecord {
                url: "https://example.com/a".to_string(),
                title: "A".to_string(),
                content: "<p>body</p>".to_string(),
                excerpt: String::new(),
                author: "Ann".to_string(),
                site_name: "example.com".to_string(),
                image_url: String::new(),
            },
            saved_at: OffsetDateTime::UNIX_EPOCH,
            read_status: true,
        }
    }

    #[test]
    fn test_stored_article_json_is_flat() {
        let json = serde_json::to_value(stored()).unwrap();
        assert_eq!(json["url"], "https://example.com/a");
        assert_eq!(json["siteName"], "example.com");
        assert_eq!(json["savedAt"], "1970-01-01T00:00:00Z");
        assert_eq!(json["readStatus"], true);
        assert!(json.get("record").is_none());
    }

    #[test]
    fn test_summary_drops_content() {
        let summary = ArticleSummary::from(stored());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["author"], "Ann");
        assert!(summary.read_status);
    }
}
