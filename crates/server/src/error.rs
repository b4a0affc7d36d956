//! API error responses.
//!
//! Extraction failures, storage failures and bad requests stay distinct so
//! each maps to its own status code and JSON body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lumpy_core::LumpyError;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("URL is required")]
    MissingUrl,

    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },

    #[error(transparent)]
    Extraction(#[from] LumpyError),

    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Article not found")]
    NotFound,
}

impl ApiError {
    /// Wraps a store failure with the message shown to clients.
    pub fn storage(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Storage { context, source }
    }
}

/// Status for a failed extraction. The upstream status, if any, goes in the
/// body instead.
pub fn extraction_status(err: &LumpyError) -> StatusCode {
    match err {
        LumpyError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        LumpyError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        LumpyError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest { status: rejection.status(), message: rejection.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingUrl => (StatusCode::BAD_REQUEST, json!({ "error": "URL is required" })),
            Self::BadRequest { status, message } => (*status, json!({ "error": message })),
            Self::Extraction(err) => {
                tracing::warn!(url = err.url(), kind = err.kind(), cause = %err.cause(), "extraction failed");
                (
                    extraction_status(err),
                    json!({
                        "error": "Failed to extract article content",
                        "kind": err.kind(),
                        "details": err.cause(),
                        "url": err.url(),
                        "status": err.status(),
                    }),
                )
            }
            Self::Storage { context, source } => {
                tracing::error!(error = %source, "{}", context);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": context }))
            }
            Self::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Article not found" })),
        };

        (status, Json(body)).into_response()
    }
}
