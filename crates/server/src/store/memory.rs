use std::collections::HashMap;

use async_trait::async_trait;
use lumpy_core::ArticleRecord;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ArticleSummary, RecordStore, StoreError, StoredArticle};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    articles: HashMap<Uuid, Entry>,
    by_url: HashMap<String, Uuid>,
    next_seq: u64,
    closed: bool,
}

/// `seq` orders saves made within the same clock tick.
#[derive(Debug)]
struct Entry {
    seq: u64,
    article: StoredArticle,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed { Err(StoreError::Closed) } else { Ok(()) }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, record: ArticleRecord) -> Result<StoredArticle, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;

        let id = inner.by_url.get(&record.url).copied().unwrap_or_else(Uuid::new_v4);
        inner.by_url.insert(record.url.clone(), id);

        let article = StoredArticle { id, record, saved_at: OffsetDateTime::now_utc(), read_status: false };
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.articles.insert(id, Entry { seq, article: article.clone() });

        Ok(article)
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ArticleSummary>, StoreError> {
        let inner = self.inner.read().await;
        inner.check_open()?;

        let mut entries: Vec<&Entry> = inner.articles.values().collect();
        entries.sort_by(|a, b| (b.article.saved_at, b.seq).cmp(&(a.article.saved_at, a.seq)));

        Ok(entries
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|entry| ArticleSummary::from(entry.article.clone()))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredArticle>, StoreError> {
        let inner = self.inner.read().await;
        inner.check_open()?;
        Ok(inner.articles.get(&id).map(|entry| entry.article.clone()))
    }

    async fn set_read_status(&self, id: Uuid, read: bool) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        match inner.articles.get_mut(&id) {
            Some(entry) => {
                entry.article.read_status = read;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        inner.check_open()?;
        match inner.articles.remove(&id) {
            Some(entry) => {
                inner.by_url.remove(&entry.article.record.url);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(&self) {
        let mut inner = self.inner.write().await;
        inner.closed = true;
        inner.articles.clear();
        inner.by_url.clear();
    }
}
