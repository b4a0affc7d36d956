//! URL in, record out.
//!
//! [`Pipeline::process`] validates the URL, fetches the page once, rejects binary
//! bodies, and runs the [`Extractor`] on tokio's blocking pool. Bodies declared
//! as something other than markup skip straight to the metadata fallback.
//! Every failure comes back as a classified [`LumpyError`].

use std::sync::Arc;

use crate::extractor::{Extraction, Extractor, ExtractorConfig};
use crate::fetch::{FetchConfig, Fetcher, RawPage};
use crate::parse::check_parseable;
use crate::record::ArticleRecord;
use crate::{ArticleUrl, LumpyError, Result};

/// Fetch-and-extract pipeline.
///
/// Cloning is cheap: the HTTP client pool and the extractor are shared.
#[derive(Debug, Clone)]
pub struct Pipeline {
    fetcher: Fetcher,
    extractor: Arc<Extractor>,
}

impl Pipeline {
    /// Builds a pipeline from fetch and extractor settings.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built; see [`Fetcher::new`].
    pub fn new(fetch: &FetchConfig, extractor: ExtractorConfig) -> Result<Self> {
        Ok(Self::from_parts(Fetcher::new(fetch)?, Extractor::with_config(extractor)))
    }

    pub fn from_parts(fetcher: Fetcher, extractor: Extractor) -> Self {
        Self { fetcher, extractor: Arc::new(extractor) }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Turns `url` into an article record.
    ///
    /// # Errors
    ///
    /// - [`LumpyError::InvalidUrl`] before any network access
    /// - [`LumpyError::Fetch`] for transport failures and non-2xx statuses
    /// - [`LumpyError::Parse`] when the body is binary or the parser panics
    pub async fn process(&self, url: &str) -> Result<ArticleRecord> {
        self.process_detailed(url).await.map(|extraction| extraction.record)
    }

    /// Like [`process`](Self::process), also reporting the extraction stage.
    #[tracing::instrument(level = "info", skip(self), fields(stage = tracing::field::Empty))]
    pub async fn process_detailed(&self, url: &str) -> Result<Extraction> {
        let article_url = ArticleUrl::parse(url)?;
        let RawPage { body, final_url, content_type, .. } = self.fetcher.fetch(&article_url).await?;

        check_parseable(&body).map_err(|reason| LumpyError::parse(url, reason))?;

        let markup = is_markup(content_type.as_deref());
        if !markup {
            tracing::debug!(url, content_type = content_type.as_deref().unwrap_or_default(), "not a markup document, scraping metadata only");
        }

        let extractor = Arc::clone(&self.extractor);
        let task_url = article_url.clone();
        let extraction = tokio::task::spawn_blocking(move || {
            if markup {
                extractor.extract_detailed(&body, &task_url, &final_url)
            } else {
                extractor.extract_metadata(&body, &task_url)
            }
        })
        .await
        .map_err(|e| {
            let reason = if e.is_panic() { "document parser panicked" } else { "extraction was cancelled" };
            tracing::warn!(url, error = %e, "extraction task failed");
            LumpyError::parse(url, reason)
        })?;

        tracing::Span::current().record("stage", tracing::field::display(extraction.stage));
        Ok(extraction)
    }
}

/// Whether a declared content type is worth a readability pass. A missing
/// header counts as markup.
fn is_markup(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_markup() {
        assert!(is_markup(None));
        assert!(is_markup(Some("text/html; charset=utf-8")));
        assert!(is_markup(Some("application/xhtml+xml")));
        assert!(is_markup(Some("text/plain")));
        assert!(!is_markup(Some("application/pdf")));
        assert!(!is_markup(Some("application/json")));
        assert!(!is_markup(Some("application/octet-stream")));
    }
}
