//! Metadata-scraping fallback for pages the readability pass rejects.
//!
//! Reads a handful of well-known tags and the page's visible text. Nothing
//! here can fail; missing sources simply stay `None`.

use crate::parse::Document;

/// Raw values scraped from a page, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedFields {
    /// Text of the first `<title>`.
    pub title: Option<String>,
    /// Visible text of `<body>`.
    pub content: Option<String>,
    /// `meta[name="description"]`
    pub excerpt: Option<String>,
    /// `meta[name="author"]`
    pub author: Option<String>,
    /// `meta[property="og:site_name"]`
    pub site_name: Option<String>,
    /// `meta[property="og:image"]`
    pub image: Option<String>,
}

/// Scrapes the fallback fields from `doc`.
pub fn scrape(doc: &Document) -> ScrapedFields {
    ScrapedFields {
        title: doc.title(),
        content: doc.body().map(|body| body.visible_text()),
        excerpt: doc.meta_by_name("description"),
        author: doc.meta_by_name("author"),
        site_name: doc.meta_by_property("og:site_name"),
        image: doc.meta_by_property("og:image"),
    }
}
