use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::Document;

/// schema.org types treated as an article.
static ARTICLE_TYPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(Article|AdvertiserContentArticle|NewsArticle|AnalysisNewsArticle|AskPublicNewsArticle|BackgroundNewsArticle|OpinionNewsArticle|ReportageNewsArticle|ReviewNewsArticle|Report|SatiricalArticle|ScholarlyArticle|MedicalScholarlyArticle|SocialMediaPosting|BlogPosting|LiveBlogPosting|DiscussionForumPosting|TechArticle|APIReference)$",
    )
    .expect("valid regex")
});

static BYLINE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)byline|author|dateline|writtenby|p-author").expect("valid regex"));

static CDATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*<!\[CDATA\[|\]\]>\s*$").expect("valid regex"));

/// Title separators; a separator only counts with a space on each side.
const TITLE_SEPARATORS: &[char] = &['|', '-', '\\', '/', '>', '»'];

/// Separators that imply a site hierarchy rather than a subtitle.
const HIERARCHICAL_SEPARATORS: &[char] = &['\\', '/', '>', '»'];

/// Page metadata gathered for the readability pass.
///
/// Every field is `None` when no source supplied a non-blank value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    /// `og:image`, consulted only when configured to fill the hero image.
    pub image: Option<String>,
}

/// Fields read from an article-typed JSON-LD block.
#[derive(Debug, Default)]
struct JsonLdArticle {
    title: Option<String>,
    byline: Option<String>,
    excerpt: Option<String>,
    site_name: Option<String>,
}

impl Document {
    /// Extract all metadata at once.
    ///
    /// Sources are tried in order and the first non-blank value wins:
    ///
    /// - title: JSON-LD `headline`/`name`, `dc:title`, `dcterm:title`,
    ///   `og:title`, meta `title`, `twitter:title`, then the cleaned `<title>`
    /// - byline: JSON-LD `author`, `dc:creator`, `dcterm:creator`, meta
    ///   `author`, `article:author`, then a byline element in the page
    /// - excerpt: JSON-LD `description`, `dc:description`,
    ///   `dcterm:description`, `og:description`, meta `description`,
    ///   `twitter:description`
    /// - site name: JSON-LD `publisher.name`, `og:site_name`
    pub fn extract_metadata(&self) -> Metadata {
        let json_ld = self.extract_json_ld().unwrap_or_default();
        let meta = self.normalized_meta();
        let pick = |keys: &[&str]| keys.iter().find_map(|key| meta.get(*key).cloned());

        let title = json_ld
            .title
            .or_else(|| pick(&["dc:title", "dcterm:title", "og:title", "title", "twitter:title"]))
            .or_else(|| self.article_title());

        let byline = json_ld
            .byline
            .or_else(|| pick(&["dc:creator", "dcterm:creator", "author"]))
            .or_else(|| pick(&["article:author"]).filter(|author| !looks_like_url(author)))
            .or_else(|| self.dom_byline());

        let excerpt = json_ld.excerpt.or_else(|| {
            pick(&["dc:description", "dcterm:description", "og:description", "description", "twitter:description"])
        });

        let site_name = json_ld.site_name.or_else(|| pick(&["og:site_name"]));

        Metadata { title, byline, excerpt, site_name, image: pick(&["og:image"]) }
    }

    /// The `<title>` text with site-name decoration removed.
    ///
    /// `"My Post | Example Blog"` becomes `"My Post"`. Short results that
    /// would lose too much of the original fall back to the full title, and a
    /// title that is very short or very long yields to a lone `<h1>`.
    pub fn article_title(&self) -> Option<String> {
        let original = self.title()?.trim().to_string();
        if original.is_empty() {
            return None;
        }

        let mut current = original.clone();
        let mut had_hierarchical = false;

        if let Some(last) = last_spaced_separator(&original) {
            had_hierarchical = spaced_separator_positions(&original)
                .any(|(_, sep)| HIERARCHICAL_SEPARATORS.contains(&sep));
            current = original[..last].to_string();

            if word_count(&current) < 3 {
                current = after_first_separator(&original).to_string();
            }
        } else if original.contains(": ") {
            let matches_heading = self
                .select("h1, h2")
                .unwrap_or_default()
                .iter()
                .any(|heading| heading.text().trim() == original);

            if !matches_heading && let Some(last_colon) = original.rfind(':') {
                current = original[last_colon + 1..].to_string();
                if word_count(&current) < 3 {
                    if let Some(first_colon) = original.find(':') {
                        current = original[first_colon + 1..].to_string();
                    }
                } else if let Some(first_colon) = original.find(':')
                    && word_count(&original[..first_colon]) > 5
                {
                    current = original.clone();
                }
            }
        } else if original.chars().count() > 150 || original.chars().count() < 15 {
            let h1s = self.select("h1").unwrap_or_default();
            if let [only] = h1s.as_slice() {
                current = only.text();
            }
        }

        let current = collapse_whitespace(&current);
        let current_words = word_count(&current);
        let original_words_without_separators = word_count(&original.replace(TITLE_SEPARATORS, ""));

        if current_words <= 4
            && (!had_hierarchical || current_words + 1 != original_words_without_separators)
        {
            return Some(original);
        }

        if current.is_empty() { Some(original) } else { Some(current) }
    }

    /// `<meta>` values keyed by lowercased name/property with `.` folded to `:`.
    /// The first non-blank value for a key wins.
    fn normalized_meta(&self) -> HashMap<String, String> {
        let mut values = HashMap::new();
        for (key, content) in self.meta_pairs() {
            let content = content.trim();
            if content.is_empty() {
                continue;
            }
            for single in key.split_whitespace() {
                let normalized = single.to_lowercase().replace('.', ":");
                values.entry(normalized).or_insert_with(|| content.to_string());
            }
        }
        values
    }

    /// Extract and parse the first article-typed JSON-LD block
    fn extract_json_ld(&self) -> Option<JsonLdArticle> {
        let scripts = self.select("script[type=\"application/ld+json\"]").ok()?;

        scripts.iter().find_map(|el| {
            let text = el.text();
            let json_str = CDATA.replace_all(text.trim(), "");
            let value = serde_json::from_str::<Value>(&json_str).ok()?;
            let article = find_article_node(&value)?;
            Some(read_json_ld_article(article))
        })
    }

    /// Text of a byline-looking element: `rel="author"`, `itemprop` containing
    /// author, or a class/id hint. Long blocks are not bylines.
    fn dom_byline(&self) -> Option<String> {
        let candidates = self.select("[rel=\"author\"], [itemprop*=\"author\"], [class], [id]").ok()?;

        candidates.iter().find_map(|el| {
            let hinted = el.attr("rel") == Some("author")
                || el.attr("itemprop").is_some_and(|prop| prop.contains("author"))
                || BYLINE_HINT.is_match(&el.class_and_id());
            if !hinted {
                return None;
            }

            let text = collapse_whitespace(&el.text());
            (!text.is_empty() && text.chars().count() < 100).then_some(text)
        })
    }
}

fn find_article_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_article_node),
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph")
                && let Some(found) = find_article_node(graph)
            {
                return Some(found);
            }
            let is_article = match map.get("@type") {
                Some(Value::String(kind)) => ARTICLE_TYPES.is_match(kind),
                Some(Value::Array(kinds)) => kinds.iter().filter_map(Value::as_str).any(|k| ARTICLE_TYPES.is_match(k)),
                _ => false,
            };
            is_article.then_some(value)
        }
        _ => None,
    }
}

fn read_json_ld_article(article: &Value) -> JsonLdArticle {
    let text = |key: &str| {
        article.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
    };

    JsonLdArticle {
        title: text("headline").or_else(|| text("name")),
        byline: article.get("author").and_then(author_from_json_ld),
        excerpt: text("description"),
        site_name: article
            .get("publisher")
            .and_then(|publisher| publisher.get("name"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// Author name from a JSON-LD `author` field: a string, an object with
/// `name`, or a list of those joined with ", ".
fn author_from_json_ld(author: &Value) -> Option<String> {
    let name = match author {
        Value::String(name) => Some(name.trim().to_string()),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(|s| s.trim().to_string()),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(author_from_json_ld).collect();
            Some(names.join(", "))
        }
        _ => None,
    };
    name.filter(|s| !s.is_empty())
}

/// Byte offsets and characters of separators that have a space on both sides.
fn spaced_separator_positions(title: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    title.char_indices().filter(move |&(idx, ch)| {
        TITLE_SEPARATORS.contains(&ch)
            && title[..idx].ends_with(' ')
            && title[idx + ch.len_utf8()..].starts_with(' ')
    })
}

fn last_spaced_separator(title: &str) -> Option<usize> {
    spaced_separator_positions(title).last().map(|(idx, _)| idx)
}

fn after_first_separator(title: &str) -> &str {
    match title.char_indices().find(|(_, ch)| TITLE_SEPARATORS.contains(ch)) {
        Some((idx, ch)) => &title[idx + ch.len_utf8()..],
        None => title,
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn looks_like_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML_WITH_META: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page Title</title>
            <meta name="author" content="John Doe">
            <meta name="description" content="This is a test description of the page.">
            <meta property="og:title" content="OG Title">
            <meta property="og:description" content="OG Description">
            <meta property="og:site_name" content="Example Site">
            <meta property="og:image" content="https://example.com/hero.jpg">
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "NewsArticle",
                "headline": "JSON-LD Headline",
                "author": {
                    "@type": "Person",
                    "name": "Jane Smith"
                },
                "description": "JSON-LD Description",
                "publisher": {
                    "@type": "Organization",
                    "name": "JSON-LD Publisher"
                }
            }
            </script>
        </head>
        <body>
            <h1>Main Heading</h1>
            <p>This is the first paragraph of the content.</p>
        </body>
        </html>
    "#;

    #[test]
    fn test_json_ld_wins() {
        let metadata = Document::parse(HTML_WITH_META).extract_metadata();
        assert_eq!(metadata.title.as_deref(), Some("JSON-LD Headline"));
        assert_eq!(metadata.byline.as_deref(), Some("Jane Smith"));
        assert_eq!(metadata.excerpt.as_deref(), Some("JSON-LD Description"));
        assert_eq!(metadata.site_name.as_deref(), Some("JSON-LD Publisher"));
        assert_eq!(metadata.image.as_deref(), Some("https://example.com/hero.jpg"));
    }

    #[test]
    fn test_meta_tags_without_json_ld() {
        let html = HTML_WITH_META.replace("application/ld+json", "text/plain");
        let metadata = Document::parse(&html).extract_metadata();
        assert_eq!(metadata.title.as_deref(), Some("OG Title"));
        assert_eq!(metadata.byline.as_deref(), Some("John Doe"));
        assert_eq!(metadata.excerpt.as_deref(), Some("OG Description"));
        assert_eq!(metadata.site_name.as_deref(), Some("Example Site"));
    }

    #[test]
    fn test_dublin_core_outranks_open_graph() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <meta name="DC.title" content="Dublin Core Title">
            <meta name="DC.description" content="Dublin Core Description">
            <meta name="description" content="Plain Description">
        </head><body></body></html>"#;
        let metadata = Document::parse(html).extract_metadata();
        assert_eq!(metadata.title.as_deref(), Some("Dublin Core Title"));
        assert_eq!(metadata.excerpt.as_deref(), Some("Dublin Core Description"));
    }

    #[test]
    fn test_non_article_json_ld_ignored() {
        let html = r#"<html><head>
            <title>Fallback Title For This Page</title>
            <script type="application/ld+json">{"@type": "Organization", "name": "Org"}</script>
        </head><body></body></html>"#;
        let metadata = Document::parse(html).extract_metadata();
        assert_eq!(metadata.title.as_deref(), Some("Fallback Title For This Page"));
        assert_eq!(metadata.site_name, None);
    }

    #[test]
    fn test_json_ld_graph_and_author_list() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [
                {"@type": "WebSite", "name": "Site"},
                {"@type": ["BlogPosting"], "name": "Graph Post",
                 "author": [{"name": "First Author"}, {"name": "Second Author"}]}
            ]}
        </script></head><body></body></html>"#;
        let metadata = Document::parse(html).extract_metadata();
        assert_eq!(metadata.title.as_deref(), Some("Graph Post"));
        assert_eq!(metadata.byline.as_deref(), Some("First Author, Second Author"));
    }

    #[test]
    fn test_malformed_json_ld_skipped() {
        let html = r#"<html><head>
            <script type="application/ld+json">{ not json </script>
            <meta property="og:title" content="OG Title">
        </head><body></body></html>"#;
        assert_eq!(Document::parse(html).extract_metadata().title.as_deref(), Some("OG Title"));
    }

    #[test]
    fn test_article_author_url_skipped() {
        let html = r#"<html><head>
            <meta property="article:author" content="https://facebook.com/someone">
        </head><body><span class="byline">By Sam Writer</span></body></html>"#;
        assert_eq!(Document::parse(html).extract_metadata().byline.as_deref(), Some("By Sam Writer"));
    }

    #[test]
    fn test_dom_byline_rel_author() {
        let html = r#"<html><body><p>Story</p><a rel="author" href="/u/kim">Kim Lee</a></body></html>"#;
        assert_eq!(Document::parse(html).extract_metadata().byline.as_deref(), Some("Kim Lee"));
    }

    #[test]
    fn test_blank_meta_values_ignored() {
        let html = r#"<html><head>
            <meta property="og:title" content="   ">
            <meta name="twitter:title" content="Twitter Title">
        </head><body></body></html>"#;
        assert_eq!(Document::parse(html).extract_metadata().title.as_deref(), Some("Twitter Title"));
    }

    fn cleaned(title: &str, body: &str) -> Option<String> {
        let html = format!("<html><head><title>{}</title></head><body>{}</body></html>", title, body);
        Document::parse(&html).article_title()
    }

    #[test]
    fn test_title_site_suffix_removed() {
        assert_eq!(
            cleaned("Why Rust Ownership Works Well | Example Blog", "").as_deref(),
            Some("Why Rust Ownership Works Well")
        );
    }

    #[test]
    fn test_title_short_prefix_uses_suffix() {
        assert_eq!(
            cleaned("Example - A Long Headline About Something Important", "").as_deref(),
            Some("A Long Headline About Something Important")
        );
    }

    #[test]
    fn test_title_too_short_after_cleanup_reverts() {
        assert_eq!(cleaned("Hello | Example", "").as_deref(), Some("Hello | Example"));
    }

    #[test]
    fn test_title_colon_suffix() {
        assert_eq!(
            cleaned("Example News: The Full Story Of A Very Long Day", "").as_deref(),
            Some("The Full Story Of A Very Long Day")
        );
    }

    #[test]
    fn test_title_colon_matching_heading_kept() {
        let title = "Guide: Writing Tests That Matter Most";
        assert_eq!(cleaned(title, &format!("<h1>{}</h1>", title)).as_deref(), Some(title));
    }

    #[test]
    fn test_short_title_yields_to_single_h1() {
        assert_eq!(
            cleaned("Home", "<h1>An Actually Descriptive Article Heading</h1>").as_deref(),
            Some("An Actually Descriptive Article Heading")
        );
        assert_eq!(cleaned("Hello", "").as_deref(), Some("Hello"));
    }

    #[test]
    fn test_missing_or_blank_title() {
        assert_eq!(Document::parse("<html><body></body></html>").article_title(), None);
        assert_eq!(cleaned("   ", ""), None);
    }
}
