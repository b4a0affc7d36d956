//! Streaming cleanup of raw HTML before scoring.
//!
//! Every pass is a `lol_html` rewrite over the markup, so nothing here builds a
//! DOM. A rewrite that fails (malformed input the rewriter refuses) leaves the
//! markup of that pass untouched.

use std::sync::LazyLock;

use lol_html::{RewriteStrSettings, doc_comments, element, rewrite_str};
use regex::Regex;
use url::Url;

use crate::scoring::{MAYBE_CANDIDATE, UNLIKELY_CANDIDATES};

static HIDDEN_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("valid regex"));

/// Tags that are never kept, together with their content.
const UNWANTED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "canvas", "object", "embed", "template"];

/// Elements the unlikely-candidate pass must never drop.
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main", "a"];

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove elements whose class/id look like page chrome
    pub remove_unlikely: bool,
    /// Whether to remove elements hidden with inline styles or `hidden`
    pub remove_hidden: bool,
    /// Base URL for converting relative `a[href]` and `img[src]`
    pub base_url: Option<Url>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { remove_unlikely: true, remove_hidden: true, base_url: None }
    }
}

/// Preprocess HTML by removing unwanted elements and absolutizing links
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = remove_unwanted_tags(html);

    if config.remove_unlikely {
        processed = remove_unlikely_candidates(&processed);
    }

    if config.remove_hidden {
        processed = remove_hidden_elements(&processed);
    }

    if let Some(base_url) = &config.base_url {
        processed = convert_relative_urls(&processed, base_url);
    }

    processed
}

/// Remove non-content tags with their content, and all comments
fn remove_unwanted_tags(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: UNWANTED_TAGS
                .iter()
                .map(|tag| {
                    element!(tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            document_content_handlers: vec![doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    result.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "tag removal skipped");
        html.to_string()
    })
}

/// Remove elements whose class or id matches the unlikely patterns, unless
/// they also look like content.
fn remove_unlikely_candidates(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                if PROTECTED_TAGS.contains(&el.tag_name().to_ascii_lowercase().as_str()) {
                    return Ok(());
                }

                let class = el.get_attribute("class").unwrap_or_default();
                let id = el.get_attribute("id").unwrap_or_default();
                let match_string = format!("{} {}", class, id);

                if UNLIKELY_CANDIDATES.is_match(&match_string) && !MAYBE_CANDIDATE.is_match(&match_string) {
                    el.remove();
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    result.unwrap_or_else(|_| html.to_string())
}

/// Convert relative URLs to absolute URLs
pub fn convert_relative_urls(html: &str, base_url: &Url) -> String {
    let absolutize = |value: &str| -> Option<String> {
        if value.starts_with('#') || value.starts_with("javascript:") || value.starts_with("data:") {
            return None;
        }
        base_url.join(value).ok().map(String::from)
    };

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    if let Some(absolute) = el.get_attribute("href").as_deref().and_then(absolutize) {
                        el.set_attribute("href", &absolute)?;
                    }
                    Ok(())
                }),
                element!("img[src]", |el| {
                    if let Some(absolute) = el.get_attribute("src").as_deref().and_then(absolutize) {
                        el.set_attribute("src", &absolute)?;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    );

    result.unwrap_or_else(|_| html.to_string())
}

/// Remove elements with display:none, visibility:hidden, or `hidden`
fn remove_hidden_elements(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                let hidden_attr = el.has_attribute("hidden");
                let hidden_style = el.get_attribute("style").is_some_and(|style| HIDDEN_STYLE.is_match(&style));
                if hidden_attr || hidden_style {
                    el.remove();
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    result.unwrap_or_else(|_| html.to_string())
}
