//! HTML parsing and DOM navigation.
//!
//! [`Document`] wraps a lenient html5ever parse (via `scraper`); malformed
//! markup still yields a tree. [`Element`] is a copyable handle into that tree
//! that hashes by node identity, so it can key score tables.
//!
//! # Example
//!
//! ```rust
//! use lumpy_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Title</title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.title(), Some("Title".to_string()));
//! assert_eq!(doc.select("p.content").unwrap().len(), 1);
//! ```

use std::hash::{Hash, Hasher};

use scraper::{ElementRef, Html, Node, Selector};

use crate::{LumpyError, Result};

/// Elements whose text is never shown to a reader.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that break a `div` out of "paragraph" treatment.
const BLOCK_TAGS: &[&str] = &[
    "a", "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul", "section", "article", "aside", "figure",
    "header", "footer", "nav", "form",
];

/// Represents a parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses an HTML document. Parsing is lenient and never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Parses an HTML fragment such as extracted article content.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Serializes the whole document back to HTML.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// The root `<html>` element.
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`LumpyError::Parse`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// First element matching `selector`, if any.
    pub fn select_first(&'_ self, selector: &str) -> Option<Element<'_>> {
        let sel = Selector::parse(selector).ok()?;
        self.html.select(&sel).next().map(|el| Element { element: el })
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<Element<'_>> {
        self.select_first("body")
    }

    /// Text of the first `<title>` element.
    ///
    /// Returns `None` when there is no `<title>`; an empty title element yields
    /// `Some("")`.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").map(|el| el.text())
    }

    /// `content` of the first `<meta name="...">` with exactly this name.
    pub fn meta_by_name(&self, name: &str) -> Option<String> {
        self.meta_where("name", name)
    }

    /// `content` of the first `<meta property="...">` with exactly this property.
    pub fn meta_by_property(&self, property: &str) -> Option<String> {
        self.meta_where("property", property)
    }

    fn meta_where(&self, attr: &str, value: &str) -> Option<String> {
        let sel = Selector::parse("meta").ok()?;
        self.html
            .select(&sel)
            .find(|el| el.value().attr(attr) == Some(value))
            .and_then(|el| el.value().attr("content"))
            .map(str::to_string)
    }

    /// All `<meta>` tags as `(key, content)` pairs, keyed by `name`, then
    /// `property`, then `itemprop`.
    pub fn meta_pairs(&self) -> Vec<(String, String)> {
        let Some(sel) = Selector::parse("meta[content]").ok() else {
            return Vec::new();
        };

        self.html
            .select(&sel)
            .filter_map(|el| {
                let value = el.value();
                let key = value.attr("name").or_else(|| value.attr("property")).or_else(|| value.attr("itemprop"))?;
                let content = value.attr("content")?;
                Some((key.to_string(), content.to_string()))
            })
            .collect()
    }

    /// Detaches every element matching `selector` for which `predicate`
    /// holds, returning how many were removed.
    ///
    /// Matches are collected before any removal, so the predicate always sees
    /// the unmodified tree.
    ///
    /// # Errors
    ///
    /// Returns [`LumpyError::Parse`] if the selector is invalid.
    pub fn remove_where(&mut self, selector: &str, predicate: impl Fn(&Element<'_>) -> bool) -> Result<usize> {
        let sel = parse_selector(selector)?;
        let doomed: Vec<_> =
            self.html.select(&sel).filter(|el| predicate(&Element { element: *el })).map(|el| el.id()).collect();

        for id in &doomed {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }
        Ok(doomed.len())
    }

    /// Gets all text content from the document, scripts included.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| LumpyError::parse(selector, format!("invalid selector: {}", e)))
}

/// A handle to one element of a [`Document`].
///
/// Equality and hashing use node identity, not markup: two identical `<p>`
/// elements at different positions are different keys.
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.element.id() == other.element.id()
    }
}

impl Eq for Element<'_> {}

impl Hash for Element<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element.id().hash(state);
    }
}

impl<'a> Element<'a> {
    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Concatenation of every text node below this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text as a reader would see it: script, style, noscript and template
    /// contents are skipped.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        for node in self.element.descendants() {
            if let Node::Text(text) = node.value() {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor.value().as_element().is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
                });
                if !hidden {
                    out.push_str(text);
                }
            }
        }
        out
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// `class` and `id` joined by a space, for pattern matching.
    pub fn class_and_id(&self) -> String {
        let class = self.attr("class").unwrap_or_default();
        let id = self.attr("id").unwrap_or_default();
        format!("{} {}", class, id)
    }

    /// Parent element, or `None` at the root.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Ancestors from the parent upward.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.ancestors().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Direct element children in document order.
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.children().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Whether any descendant is a block-level element.
    pub fn has_block_descendant(&self) -> bool {
        self.element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .any(|el| BLOCK_TAGS.contains(&el.value().name()))
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`LumpyError::Parse`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

/// Checks that a fetched body can be treated as an HTML document.
///
/// Lenient parsing accepts almost anything, including text served under a
/// non-HTML content type, which then lands in the metadata fallback. Only
/// binary data (NUL bytes in the first kilobyte) is rejected.
pub fn check_parseable(body: &str) -> std::result::Result<(), String> {
    if looks_binary(body) {
        return Err("response body is binary, not an HTML document".to_string());
    }

    Ok(())
}

fn looks_binary(body: &str) -> bool {
    let head = &body.as_bytes()[..body.len().min(1024)];
    head.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
            <meta name="description" content="A description">
            <meta property="og:site_name" content="Example Site">
            <style>body { color: red; }</style>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2</p>
            <a href="https://example.com">Link</a>
            <script>var hidden = "script text";</script>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        assert!(matches!(doc.select("[[invalid"), Err(LumpyError::Parse { .. })));
    }

    #[test]
    fn test_meta_lookup_is_attribute_specific() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.meta_by_name("description"), Some("A description".to_string()));
        assert_eq!(doc.meta_by_property("og:site_name"), Some("Example Site".to_string()));
        assert_eq!(doc.meta_by_name("og:site_name"), None);
        assert_eq!(doc.meta_by_property("description"), None);
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let doc = Document::parse(SAMPLE_HTML);
        let body = doc.body().unwrap();
        let text = body.visible_text();

        assert!(text.contains("Paragraph 1"));
        assert!(text.contains("Link"));
        assert!(!text.contains("script text"));
        assert!(body.text().contains("script text"));
    }

    #[test]
    fn test_element_identity() {
        let doc = Document::parse("<div><p>same</p><p>same</p></div>");
        let ps = doc.select("p").unwrap();
        assert_ne!(ps[0], ps[1]);
        assert_eq!(ps[0].parent(), ps[1].parent());
        assert_eq!(ps[0].parent().unwrap().tag_name(), "div");
    }

    #[test]
    fn test_block_descendants() {
        let doc = Document::parse("<div id='a'>Just <em>inline</em> text</div><div id='b'><p>Block</p></div>");
        let divs = doc.select("div").unwrap();
        assert!(!divs[0].has_block_descendant());
        assert!(divs[1].has_block_descendant());
    }

    #[test]
    fn test_remove_where() {
        let mut doc = Document::parse("<div><p>keep</p><p></p><p>keep too</p><span></span></div>");
        let removed = doc.remove_where("p, span", |el| el.text().is_empty()).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(doc.select("div").unwrap()[0].inner_html(), "<p>keep</p><p>keep too</p>");
    }

    #[test]
    fn test_missing_title() {
        let doc = Document::parse("<html><body></body></html>");
        assert_eq!(doc.title(), None);
    }

    #[test]
    fn test_check_parseable() {
        assert!(check_parseable("<html></html>").is_ok());
        assert!(check_parseable("%PDF-1.4 some text stream").is_ok());
        assert!(check_parseable(r#"{"title": "not html"}"#).is_ok());
        assert!(check_parseable("\u{89}PNG\r\n\u{1a}\n\0\0\0\rIHDR").is_err());
        assert!(check_parseable("%PDF-1.7\0\0binary").is_err());
    }
}
