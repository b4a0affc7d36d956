//! Cleanup of the extracted article fragment.
//!
//! Runs on the HTML that the readability pass selected, not on the whole
//! page. String-level passes use regexes; structural passes parse the fragment
//! and detach nodes.

use std::sync::LazyLock;

use lol_html::{RewriteStrSettings, element, rewrite_str};
use regex::Regex;

use crate::parse::{Document, Element};
use crate::scoring::link_density;

static CONDITIONAL_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\[if[^\]]*\]>.*?<!\[endif\]-->|<!--<!\[if[^\]]*\]>.*?<!\[endif\]-->").expect("valid regex")
});

/// Containers that may be dropped when empty.
const EMPTY_CANDIDATES: &str =
    "div, p, span, section, article, aside, nav, header, footer, ul, ol, li, blockquote, h1, h2, h3, h4, h5, h6, figure";

/// Blocks judged by their link density.
const LINK_BLOCKS: &str = "div, section, aside, nav, ul, ol, table, form, header, footer";

/// Media elements that keep an otherwise textless container alive.
const MEDIA: &str = "img, picture, video, audio, iframe, embed, object, math";

/// Configuration for HTML post-processing cleanup
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    /// Whether to remove containers without text or media
    pub remove_empty_nodes: bool,
    /// Whether to remove blocks that are mostly link text
    pub remove_high_link_density: bool,
    /// Link density above which a block is removed (0.0 to 1.0)
    pub max_link_density: f64,
    /// Whether to strip all images
    pub strip_images: bool,
    /// Whether to keep class attributes (default: false)
    pub keep_classes: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            remove_empty_nodes: true,
            remove_high_link_density: true,
            max_link_density: 0.5,
            strip_images: false,
            keep_classes: false,
        }
    }
}

/// Post-process extracted HTML by cleaning up remaining unwanted content
pub fn postprocess_html(html: &str, config: &PostProcessConfig) -> String {
    let without_comments = remove_conditional_comments(html);
    let mut doc = Document::parse_fragment(&without_comments);

    if config.strip_images {
        remove_all(&mut doc, "img, picture");
    }

    if config.remove_high_link_density {
        let max = config.max_link_density;
        let removed = doc.remove_where(LINK_BLOCKS, |el| has_text(el) && link_density(el) > max).unwrap_or_default();
        if removed > 0 {
            tracing::trace!(removed, "dropped link-heavy blocks");
        }
    }

    if config.remove_empty_nodes {
        doc.remove_where(EMPTY_CANDIDATES, |el| !has_text(el) && !has_media(el)).unwrap_or_default();
    }

    let processed = doc.root().inner_html();

    if config.keep_classes { processed } else { strip_classes(&processed) }
}

/// Remove Internet Explorer conditional comments
///
/// IE conditional comments have the format:
/// <!--[if condition]>...<![endif]-->
/// <!--[if !IE]>...<![endif]-->
fn remove_conditional_comments(html: &str) -> String {
    CONDITIONAL_COMMENT.replace_all(html, "").to_string()
}

/// Strip all class attributes from HTML
fn strip_classes(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("[class]", |el| {
                el.remove_attribute("class");
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    result.unwrap_or_else(|_| html.to_string())
}

fn remove_all(doc: &mut Document, selector: &str) {
    doc.remove_where(selector, |_| true).unwrap_or_default();
}

fn has_text(el: &Element<'_>) -> bool {
    !el.text().trim().is_empty()
}

fn has_media(el: &Element<'_>) -> bool {
    el.select(MEDIA).map(|found| !found.is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_conditional_comments() {
        let html = r#"<p>Before</p><!--[if IE]><p>IE only</p><![endif]--><p>After</p>"#;
        let result = remove_conditional_comments(html);
        assert!(!result.contains("IE only"));
        assert!(result.contains("Before"));
        assert!(result.contains("After"));
    }

    #[test]
    fn test_strip_images() {
        let html = r#"<p>Text</p><img src="a.jpg"><p><img src="b.jpg"> caption</p>"#;
        let config = PostProcessConfig { strip_images: true, ..Default::default() };
        let result = postprocess_html(html, &config);
        assert!(!result.contains("<img"));
        assert!(result.contains("caption"));
    }

    #[test]
    fn test_images_kept_by_default() {
        let html = r#"<p><img src="https://example.com/a.jpg"></p><p>Text</p>"#;
        let result = postprocess_html(html, &PostProcessConfig::default());
        assert!(result.contains(r#"<img src="https://example.com/a.jpg">"#));
    }

    #[test]
    fn test_strip_classes() {
        let html = r#"<div class="wrapper"><p class="lead">Text</p></div>"#;
        let result = postprocess_html(html, &PostProcessConfig::default());
        assert!(!result.contains("class="));
        assert!(result.contains("<p>Text</p>"));

        let kept = postprocess_html(html, &PostProcessConfig { keep_classes: true, ..Default::default() });
        assert!(kept.contains(r#"class="lead""#));
    }

    #[test]
    fn test_remove_empty_nodes() {
        let html = r#"<div><p>Content</p><p>   </p><div><span></span></div><nav></nav></div>"#;
        let result = postprocess_html(html, &PostProcessConfig::default());
        assert_eq!(result, "<div><p>Content</p></div>");
    }

    #[test]
    fn test_remove_high_link_density_nodes() {
        let html = r##"
            <div><p>Real prose with a <a href="#">single link</a> inside a longer sentence of text.</p></div>
            <ul><li><a href="/a">Home</a></li><li><a href="/b">About</a></li></ul>
        "##;
        let result = postprocess_html(html, &PostProcessConfig::default());
        assert!(result.contains("Real prose"));
        assert!(!result.contains("About"));
    }

    #[test]
    fn test_preformatted_text_untouched() {
        let html = "<pre>line one\n    indented</pre>";
        let result = postprocess_html(html, &PostProcessConfig::default());
        assert_eq!(result, html);
    }
}
