//! `/api/articles` handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::store::{ArticleSummary, StoredArticle};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub saved: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Limit clamped to `1..=100`, offset to `0..`.
    fn page(&self) -> (u32, u32) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).clamp(0, i64::from(u32::MAX));
        (limit as u32, offset as u32)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadStatusRequest {
    #[serde(default)]
    pub read_status: bool,
}

/// Ids that are not UUIDs cannot name an article.
fn article_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn save_article(
    State(state): State<AppState>, payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(request) = payload?;
    let url = request.url.filter(|u| !u.trim().is_empty()).ok_or(ApiError::MissingUrl)?;

    let record = state.pipeline.process(&url).await?;
    let stored = state.store.upsert(record).await.map_err(ApiError::storage("Failed to save article"))?;
    tracing::info!(id = %stored.id, url = %stored.record.url, "article saved");

    Ok(Json(SaveResponse {
        id: stored.id,
        url: stored.record.url,
        title: stored.record.title,
        excerpt: stored.record.excerpt,
        saved: true,
    }))
}

pub async fn list_articles(
    State(state): State<AppState>, query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    let Query(query) = query?;
    let (limit, offset) = query.page();
    let articles = state.store.list(limit, offset).await.map_err(ApiError::storage("Failed to fetch articles"))?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<AppState>, Path(id): Path<String>,
) -> Result<Json<StoredArticle>, ApiError> {
    let id = article_id(&id)?;
    state
        .store
        .get(id)
        .await
        .map_err(ApiError::storage("Failed to fetch article"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// An empty body marks the article unread; otherwise the body must be a JSON
/// object, with or without a content type.
pub async fn set_read_status(
    State(state): State<AppState>, Path(id): Path<String>, body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = article_id(&id)?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ReadStatusRequest::default()
    } else {
        Json::<ReadStatusRequest>::from_bytes(&body)?.0
    };
    let found = state
        .store
        .set_read_status(id, request.read_status)
        .await
        .map_err(ApiError::storage("Failed to update read status"))?;

    if found { Ok(success()) } else { Err(ApiError::NotFound) }
}

pub async fn delete_article(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = article_id(&id)?;
    let found = state.store.delete(id).await.map_err(ApiError::storage("Failed to delete article"))?;

    if found {
        tracing::info!(%id, "article deleted");
        Ok(success())
    } else {
        Err(ApiError::NotFound)
    }
}
