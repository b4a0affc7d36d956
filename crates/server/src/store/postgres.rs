use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use lumpy_core::ArticleRecord;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use super::{ArticleSummary, RecordStore, StoreError, StoredArticle};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS articles (
    id          UUID PRIMARY KEY,
    url         TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    excerpt     TEXT NOT NULL DEFAULT '',
    author      TEXT NOT NULL DEFAULT '',
    site_name   TEXT NOT NULL,
    image_url   TEXT NOT NULL DEFAULT '',
    saved_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    read_status BOOLEAN NOT NULL DEFAULT FALSE
);
CREATE INDEX IF NOT EXISTS articles_saved_at_idx ON articles (saved_at DESC);
";

const UPSERT: &str = "
INSERT INTO articles (id, url, title, content, excerpt, author, site_name, image_url, saved_at, read_status)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), FALSE)
ON CONFLICT (url) DO UPDATE SET
    title = EXCLUDED.title,
    content = EXCLUDED.content,
    excerpt = EXCLUDED.excerpt,
    author = EXCLUDED.author,
    site_name = EXCLUDED.site_name,
    image_url = EXCLUDED.image_url,
    saved_at = EXCLUDED.saved_at,
    read_status = FALSE
RETURNING id, url, title, content, excerpt, author, site_name, image_url, saved_at, read_status
";

const LIST: &str = "
SELECT id, url, title, excerpt, author, site_name, image_url, saved_at, read_status
FROM articles
ORDER BY saved_at DESC, id
LIMIT $1 OFFSET $2
";

/// PostgreSQL-backed store on a deadpool connection pool.
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    /// Connects to `database_url` and creates the schema if it is missing.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let mut config = Config::new();
        config.url = Some(database_url.to_string());
        config.manager = Some(ManagerConfig { recycling_method: RecyclingMethod::Fast });

        let pool = config.create_pool(Some(Runtime::Tokio1), NoTls)?;
        let client = pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        tracing::info!("postgres store ready");

        Ok(Self { pool })
    }
}

fn stored_article(row: &Row) -> Result<StoredArticle, tokio_postgres::Error> {
    Ok(StoredArticle {
        id: row.try_get("id")?,
        record: ArticleRecord {
            url: row.try_get("url")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            excerpt: row.try_get("excerpt")?,
            author: row.try_get("author")?,
            site_name: row.try_get("site_name")?,
            image_url: row.try_get("image_url")?,
        },
        saved_at: row.try_get("saved_at")?,
        read_status: row.try_get("read_status")?,
    })
}

fn summary(row: &Row) -> Result<ArticleSummary, tokio_postgres::Error> {
    Ok(ArticleSummary {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        excerpt: row.try_get("excerpt")?,
        author: row.try_get("author")?,
        site_name: row.try_get("site_name")?,
        image_url: row.try_get("image_url")?,
        saved_at: row.try_get("saved_at")?,
        read_status: row.try_get("read_status")?,
    })
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn upsert(&self, record: ArticleRecord) -> Result<StoredArticle, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                UPSERT,
                &[
                    &Uuid::new_v4(),
                    &record.url,
                    &record.title,
                    &record.content,
                    &record.excerpt,
                    &record.author,
                    &record.site_name,
                    &record.image_url,
                ],
            )
            .await?;
        Ok(stored_article(&row)?)
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ArticleSummary>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client.query(LIST, &[&i64::from(limit), &i64::from(offset)]).await?;
        Ok(rows.iter().map(summary).collect::<Result<_, _>>()?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredArticle>, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_opt("SELECT * FROM articles WHERE id = $1", &[&id]).await?;
        Ok(row.as_ref().map(stored_article).transpose()?)
    }

    async fn set_read_status(&self, id: Uuid, read: bool) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let updated = client.execute("UPDATE articles SET read_status = $1 WHERE id = $2", &[&read, &id]).await?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM articles WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }

    async fn close(&self) {
        self.pool.close();
        tracing::info!("postgres pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_upsert_round_trip() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let store = PostgresStore::connect(&url).await.unwrap();
        let record = ArticleRecord {
            url: format!("https://example.com/{}", Uuid::new_v4()),
            title: "Stored".to_string(),
            content: "<p>x</p>".to_string(),
            excerpt: String::new(),
            author: String::new(),
            site_name: "example.com".to_string(),
            image_url: String::new(),
        };

        let first = store.upsert(record.clone()).await.unwrap();
        assert!(store.set_read_status(first.id, true).await.unwrap());
        let second = store.upsert(record).await.unwrap();

        assert_eq!(second.id, first.id);
        assert!(!second.read_status);
        assert!(store.delete(first.id).await.unwrap());
        assert_eq!(store.get(first.id).await.unwrap(), None);
        store.close().await;
    }
}
