//! The article record and its normalization.

use serde::{Deserialize, Serialize};

use crate::ArticleUrl;

/// A saved article.
///
/// Every field is a defined string. `url` is the identity: saving the same
/// URL again replaces the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub url: String,
    /// Never empty; the URL itself when the page supplied no title.
    pub title: String,
    /// HTML fragment from the readability pass, or plain text from the
    /// fallback. May be empty.
    pub content: String,
    pub excerpt: String,
    pub author: String,
    /// Never empty for a valid URL; the hostname when the page names no site.
    pub site_name: String,
    pub image_url: String,
}

/// Field values from either extraction stage, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub image_url: Option<String>,
}

impl ExtractedFields {
    /// Turns stage output into a record.
    ///
    /// Missing values become `""`, a blank title becomes the URL text, an
    /// empty site name becomes the hostname, and whitespace-only content
    /// becomes `""`. Nothing else is trimmed.
    pub fn normalize(self, url: &ArticleUrl) -> ArticleRecord {
        let title = self.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| url.as_str().to_string());
        let content = self.content.filter(|c| !c.trim().is_empty()).unwrap_or_default();
        let site_name = self.site_name.filter(|s| !s.is_empty()).unwrap_or_else(|| url.hostname().to_string());

        ArticleRecord {
            url: url.as_str().to_string(),
            title,
            content,
            excerpt: self.excerpt.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            site_name,
            image_url: self.image_url.unwrap_or_default(),
        }
    }
}
