//! Readability pass: the primary extraction stage.
//!
//! [`Readability::parse`] cleans the page, scores candidate containers, and
//! assembles the article body, then fills title, byline, excerpt, and site name
//! from page metadata. It yields `None` when no readable text survives, which
//! hands the page to the metadata fallback.
//!
//! # Example
//!
//! ```rust
//! use lumpy_core::Readability;
//! use url::Url;
//!
//! let html = r#"<html><head><title>Hello</title></head>
//!     <body><article><p>Body text</p></article></body></html>"#;
//! let base = Url::parse("https://example.com/post").unwrap();
//!
//! let article = Readability::new().parse(html, &base).unwrap();
//! assert_eq!(article.title.as_deref(), Some("Hello"));
//! assert!(article.content.contains("<p>Body text</p>"));
//! ```

use url::Url;

use crate::extract::{ExtractConfig, extract_content};
use crate::parse::Document;
use crate::postprocess::{PostProcessConfig, postprocess_html};
use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::scoring::ScoreConfig;

/// Configuration for the Readability builder.
///
/// # Example
///
/// ```rust
/// use lumpy_core::ReadabilityConfig;
///
/// let config = ReadabilityConfig::builder()
///     .char_threshold(250)
///     .preserve_images(false)
///     .build();
/// assert_eq!(config.char_threshold, 250);
/// ```
#[derive(Debug, Clone)]
pub struct ReadabilityConfig {
    /// Text length below which a second, relaxed attempt is made (default: 500).
    pub char_threshold: usize,

    /// Maximum elements to parse; larger pages skip this stage (0 = unlimited, default: 0).
    pub max_elems_to_parse: usize,

    /// Whether the first attempt removes unlikely candidates (default: true).
    pub remove_unlikely: bool,

    /// Whether to preserve class attributes in output HTML (default: false).
    pub keep_classes: bool,

    /// Whether to preserve images in output HTML (default: true).
    pub preserve_images: bool,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self { char_threshold: 500, max_elems_to_parse: 0, remove_unlikely: true, keep_classes: false, preserve_images: true }
    }
}

impl ReadabilityConfig {
    /// Creates a new builder for ReadabilityConfig.
    pub fn builder() -> ReadabilityConfigBuilder {
        ReadabilityConfigBuilder::new()
    }
}

/// Builder for ReadabilityConfig.
pub struct ReadabilityConfigBuilder {
    config: ReadabilityConfig,
}

impl ReadabilityConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ReadabilityConfig::default() }
    }

    /// Sets the character threshold.
    pub fn char_threshold(mut self, value: usize) -> Self {
        self.config.char_threshold = value;
        self
    }

    /// Sets the maximum elements to parse.
    pub fn max_elems_to_parse(mut self, value: usize) -> Self {
        self.config.max_elems_to_parse = value;
        self
    }

    /// Sets whether to remove unlikely candidates.
    pub fn remove_unlikely(mut self, value: bool) -> Self {
        self.config.remove_unlikely = value;
        self
    }

    /// Sets whether to preserve class attributes in output HTML.
    pub fn keep_classes(mut self, value: bool) -> Self {
        self.config.keep_classes = value;
        self
    }

    /// Sets whether to preserve images in output HTML.
    pub fn preserve_images(mut self, value: bool) -> Self {
        self.config.preserve_images = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ReadabilityConfig {
        self.config
    }
}

impl Default for ReadabilityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a successful readability pass.
///
/// Optional fields are `None` when no source supplied them; turning them into
/// record strings is left to normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadableArticle {
    pub title: Option<String>,
    /// Cleaned article HTML.
    pub content: String,
    /// Character count of the content's text.
    pub length: usize,
    pub excerpt: Option<String>,
    pub byline: Option<String>,
    pub site_name: Option<String>,
    /// `og:image` of the page.
    pub image: Option<String>,
}

/// One extraction attempt's cleaned content.
struct Attempt {
    content: String,
    length: usize,
}

/// Main entry point for the readability pass.
#[derive(Debug, Clone, Default)]
pub struct Readability {
    config: ReadabilityConfig,
}

impl Readability {
    /// Creates a new Readability instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Readability instance with a custom configuration.
    pub fn with_config(config: ReadabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadabilityConfig {
        &self.config
    }

    /// Runs the pass over `html`, resolving relative links against `link_base`.
    ///
    /// Returns `None` when the cleaned content has no non-whitespace text.
    #[tracing::instrument(level = "debug", skip_all, fields(base = %link_base))]
    pub fn parse(&self, html: &str, link_base: &Url) -> Option<ReadableArticle> {
        let original = Document::parse(html);

        if self.config.max_elems_to_parse > 0 {
            let elements = original.select("*").map(|all| all.len()).unwrap_or_default();
            if elements > self.config.max_elems_to_parse {
                tracing::debug!(elements, limit = self.config.max_elems_to_parse, "page too large for readability");
                return None;
            }
        }

        let attempt = self.best_attempt(html, link_base)?;
        if attempt.length == 0 {
            tracing::debug!("no readable text");
            return None;
        }

        let metadata = original.extract_metadata();
        let excerpt = metadata.excerpt.or_else(|| first_paragraph(&attempt.content));

        Some(ReadableArticle {
            title: metadata.title,
            content: attempt.content,
            length: attempt.length,
            excerpt,
            byline: metadata.byline,
            site_name: metadata.site_name,
            image: metadata.image,
        })
    }

    /// Strict attempt first; a relaxed one when the strict text is short.
    /// The longer result wins, the strict one on a tie.
    fn best_attempt(&self, html: &str, link_base: &Url) -> Option<Attempt> {
        let strict = self.attempt(html, link_base, true);

        if strict.as_ref().is_some_and(|a| a.length >= self.config.char_threshold) {
            return strict;
        }

        let relaxed = self.attempt(html, link_base, false);
        tracing::debug!(
            strict = strict.as_ref().map(|a| a.length),
            relaxed = relaxed.as_ref().map(|a| a.length),
            "retried with relaxed rules"
        );

        match (strict, relaxed) {
            (Some(s), Some(r)) => Some(if r.length > s.length { r } else { s }),
            (s, r) => s.or(r),
        }
    }

    fn attempt(&self, html: &str, link_base: &Url, strict: bool) -> Option<Attempt> {
        let preprocess = PreprocessConfig {
            remove_unlikely: strict && self.config.remove_unlikely,
            base_url: Some(link_base.clone()),
            ..Default::default()
        };
        let doc = Document::parse(&preprocess_html(html, &preprocess));

        let extract = ExtractConfig {
            score: ScoreConfig { weight_classes: strict, ..Default::default() },
            ..Default::default()
        };
        let extracted = extract_content(&doc, &extract)?;

        let postprocess = PostProcessConfig {
            strip_images: !self.config.preserve_images,
            keep_classes: self.config.keep_classes,
            ..Default::default()
        };
        let content = postprocess_html(&extracted.content, &postprocess);
        let length = text_length(&content);

        Some(Attempt { content, length })
    }
}

/// Characters of trimmed text in an HTML fragment.
fn text_length(html: &str) -> usize {
    Document::parse_fragment(html).root().text().trim().chars().count()
}

fn first_paragraph(html: &str) -> Option<String> {
    let doc = Document::parse_fragment(html);
    let text = doc.select_first("p")?.text();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
