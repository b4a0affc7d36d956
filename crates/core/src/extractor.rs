//! Two-stage extraction from HTML to [`ArticleRecord`].
//!
//! The readability pass runs first. Only when it finds no readable text does
//! the metadata fallback scrape the page. Either way the result goes through
//! [`ExtractedFields::normalize`], so extraction of a parsed document never
//! fails.
//!
//! # Example
//!
//! ```rust
//! use lumpy_core::{ArticleUrl, Extractor};
//!
//! let url = ArticleUrl::parse("https://example.com/post").unwrap();
//! let record = Extractor::new().extract("<html><body></body></html>", &url);
//!
//! assert_eq!(record.title, "https://example.com/post");
//! assert_eq!(record.site_name, "example.com");
//! ```

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::fallback::{ScrapedFields, scrape};
use crate::parse::Document;
use crate::readability::{Readability, ReadabilityConfig, ReadableArticle};
use crate::record::{ArticleRecord, ExtractedFields};
use crate::ArticleUrl;

/// Extractor settings.
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    /// Readability pass settings.
    pub readability: ReadabilityConfig,
    /// Also fill `imageUrl` from `og:image` when the readability pass
    /// succeeds. Off by default, which leaves `imageUrl` empty for readable
    /// pages.
    pub og_image_for_readable: bool,
}

/// Which stage produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStage {
    Readability,
    Metadata,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Readability => write!(f, "readability"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

/// A record together with the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: ArticleRecord,
    pub stage: ExtractionStage,
}

/// Runs both extraction stages. Cheap to share; holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    readability: Readability,
    og_image_for_readable: bool,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            readability: Readability::with_config(config.readability),
            og_image_for_readable: config.og_image_for_readable,
        }
    }

    /// Extracts a record from `html`, resolving relative links against `url`.
    pub fn extract(&self, html: &str, url: &ArticleUrl) -> ArticleRecord {
        self.extract_detailed(html, url, url.url()).record
    }

    /// Like [`extract`](Self::extract), but resolves relative links against
    /// `link_base` (typically the URL after redirects). Identity and the
    /// title/site-name fallbacks still use `url`.
    pub fn extract_with_link_base(&self, html: &str, url: &ArticleUrl, link_base: &Url) -> ArticleRecord {
        self.extract_detailed(html, url, link_base).record
    }

    /// Extracts a record and reports which stage produced it.
    pub fn extract_detailed(&self, html: &str, url: &ArticleUrl, link_base: &Url) -> Extraction {
        if let Some(article) = self.readability.parse(html, link_base) {
            tracing::debug!(url = %url, length = article.length, "readability pass succeeded");
            return Extraction {
                record: self.readable_fields(article).normalize(url),
                stage: ExtractionStage::Readability,
            };
        }

        tracing::debug!(url = %url, "readability pass found nothing, scraping metadata");
        self.extract_metadata(html, url)
    }

    /// Skips the readability pass and scrapes `<title>` and meta tags only.
    ///
    /// Used for bodies that are not markup, such as a PDF served as text.
    pub fn extract_metadata(&self, html: &str, url: &ArticleUrl) -> Extraction {
        let scraped = scrape(&Document::parse(html));
        Extraction { record: scraped_fields(scraped).normalize(url), stage: ExtractionStage::Metadata }
    }

    fn readable_fields(&self, article: ReadableArticle) -> ExtractedFields {
        ExtractedFields {
            title: article.title,
            content: Some(article.content),
            excerpt: article.excerpt,
            author: article.byline,
            site_name: article.site_name,
            image_url: if self.og_image_for_readable { article.image } else { None },
        }
    }
}

fn scraped_fields(scraped: ScrapedFields) -> ExtractedFields {
    ExtractedFields {
        title: scraped.title,
        content: scraped.content,
        excerpt: scraped.excerpt,
        author: scraped.author,
        site_name: scraped.site_name,
        image_url: scraped.image,
    }
}
