//! Article extraction for a read-later service.
//!
//! Given a URL, [`Pipeline::process`] fetches the page and produces an
//! [`ArticleRecord`]: a readability pass extracts the article body, and pages it
//! cannot read fall back to scraping `<title>` and meta tags. The pure part,
//! [`Extractor`], works on HTML you already have and is available without the
//! `fetch` feature.

pub mod article_url;
pub mod error;
pub mod extract;
pub mod extractor;
pub mod fallback;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod metadata;
pub mod parse;
#[cfg(feature = "fetch")]
pub mod pipeline;
pub mod postprocess;
pub mod preprocess;
pub mod readability;
pub mod record;
pub mod scoring;

pub use article_url::ArticleUrl;
pub use error::{FetchFailure, LumpyError, Result};
#[doc(hidden)]
pub use extract::{ExtractConfig, ExtractedContent, extract_content};
pub use extractor::{Extraction, ExtractionStage, Extractor, ExtractorConfig};
#[cfg(feature = "fetch")]
pub use fetch::{BROWSER_USER_AGENT, FetchConfig, Fetcher, RawPage};
pub use metadata::Metadata;
pub use parse::Document;
#[cfg(feature = "fetch")]
pub use pipeline::Pipeline;
#[doc(hidden)]
pub use postprocess::{PostProcessConfig, postprocess_html};
#[doc(hidden)]
pub use preprocess::{PreprocessConfig, preprocess_html};
pub use readability::{Readability, ReadabilityConfig, ReadabilityConfigBuilder, ReadableArticle};
pub use record::{ArticleRecord, ExtractedFields};
#[doc(hidden)]
pub use scoring::{ScoreConfig, base_tag_score, class_id_weight, link_density};
