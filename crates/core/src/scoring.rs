use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Class/id fragments of page chrome: removed before scoring in strict mode.
pub static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .expect("valid regex")
});

/// Fragments that rescue an unlikely candidate.
pub static MAYBE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)and|article|body|column|content|main|shadow").expect("valid regex"));

/// Positive patterns that suggest an element contains main content
static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story")
        .expect("valid regex")
});

/// Negative patterns that suggest an element does NOT contain main content
static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget",
    )
    .expect("valid regex")
});

/// Tags whose own text is scored as a paragraph.
const PARAGRAPH_TAGS: &[&str] = &["p", "pre", "td", "section", "h2", "h3", "h4", "h5", "h6"];

/// Configuration for content scoring algorithm
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Whether class/id patterns adjust scores
    pub weight_classes: bool,
    /// Weight added or subtracted per matching class/id pattern
    pub class_weight: f64,
    /// Paragraphs shorter than this (in characters, trimmed) are not scored
    pub min_paragraph_length: usize,
    /// Characters per point for paragraph length
    pub chars_per_point: usize,
    /// Maximum points a paragraph earns from its length
    pub max_length_points: f64,
    /// How many ancestors receive a paragraph's score
    pub max_ancestor_depth: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weight_classes: true,
            class_weight: 25.0,
            min_paragraph_length: 25,
            chars_per_point: 100,
            max_length_points: 3.0,
            max_ancestor_depth: 5,
        }
    }
}

/// Calculate the base score for an element based on its tag name
///
/// - ARTICLE: +10, SECTION: +8, DIV: +5
/// - PRE, TD, BLOCKQUOTE: +3
/// - FORM, ADDRESS and list elements: -3
/// - H1-H6, TH, HEADER, FOOTER, NAV: -5
pub fn base_tag_score(element: &Element<'_>) -> f64 {
    match element.tag_name() {
        "article" => 10.0,
        "section" => 8.0,
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "form" | "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Calculate the class/ID weight adjustment for an element
///
/// Class and id are judged separately; each contributes `-class_weight` for a
/// negative match and `+class_weight` for a positive one, so the result lies
/// in `[-2w, 2w]`.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    if !config.weight_classes {
        return 0.0;
    }

    let mut weight = 0.0;
    for value in [element.attr("class"), element.attr("id")].into_iter().flatten() {
        if value.is_empty() {
            continue;
        }
        if NEGATIVE.is_match(value) {
            weight -= config.class_weight;
        }
        if POSITIVE.is_match(value) {
            weight += config.class_weight;
        }
    }
    weight
}

/// Score an ancestor starts with before any paragraph contributes.
pub fn initial_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    base_tag_score(element) + class_id_weight(element, config)
}

/// Score of a paragraph's text, or `None` when it is too short to count.
///
/// `1 + commas + min(chars / chars_per_point, max_length_points)`
pub fn paragraph_score(text: &str, config: &ScoreConfig) -> Option<f64> {
    let text = text.trim();
    let length = text.chars().count();
    if length < config.min_paragraph_length {
        return None;
    }

    let commas = text.chars().filter(|c| matches!(c, ',' | '，' | '、' | '،')).count();
    let length_points = ((length / config.chars_per_point) as f64).min(config.max_length_points);

    Some(1.0 + commas as f64 + length_points)
}

/// Divider applied to a paragraph score at ancestor `level` (0 = parent).
pub fn ancestor_divider(level: usize) -> f64 {
    match level {
        0 => 1.0,
        1 => 2.0,
        n => (n * 3) as f64,
    }
}

/// Whether `element` is scored as a paragraph: a text block tag, or a `div`
/// holding only inline content.
pub fn is_paragraph_like(element: &Element<'_>) -> bool {
    let tag = element.tag_name();
    PARAGRAPH_TAGS.contains(&tag) || (tag == "div" && !element.has_block_descendant())
}

/// Calculate the link density of an element
///
/// Link density is the ratio of link text characters to total text characters.
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text().trim().chars().count();

    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().trim().chars().count())
        .sum::<usize>();

    (link_text_length as f64 / text_length as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn first<'a>(doc: &'a Document, selector: &str) -> Element<'a> {
        doc.select(selector).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn test_base_tag_score() {
        let doc = Document::parse(
            "<article>a</article><section>s</section><div>d</div><pre>p</pre><form>f</form><nav>n</nav><span>x</span>",
        );
        assert_eq!(base_tag_score(&first(&doc, "article")), 10.0);
        assert_eq!(base_tag_score(&first(&doc, "section")), 8.0);
        assert_eq!(base_tag_score(&first(&doc, "div")), 5.0);
        assert_eq!(base_tag_score(&first(&doc, "pre")), 3.0);
        assert_eq!(base_tag_score(&first(&doc, "form")), -3.0);
        assert_eq!(base_tag_score(&first(&doc, "nav")), -5.0);
        assert_eq!(base_tag_score(&first(&doc, "span")), 0.0);
    }

    #[test]
    fn test_class_weight_positive() {
        let doc = Document::parse(r#"<div class="article-content">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), 25.0);
    }

    #[test]
    fn test_class_weight_negative() {
        let doc = Document::parse(r#"<div class="sidebar">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), -25.0);
    }

    #[test]
    fn test_class_and_id_add_up() {
        let doc = Document::parse(r#"<div class="entry" id="post-body">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), 50.0);
    }

    #[test]
    fn test_class_weight_mixed_cancels() {
        let doc = Document::parse(r#"<div class="sidebar-content">Content</div>"#);
        assert_eq!(class_id_weight(&first(&doc, "div"), &ScoreConfig::default()), 0.0);
    }

    #[test]
    fn test_class_weight_disabled() {
        let doc = Document::parse(r#"<div class="sidebar">Content</div>"#);
        let config = ScoreConfig { weight_classes: false, ..Default::default() };
        assert_eq!(class_id_weight(&first(&doc, "div"), &config), 0.0);
        assert_eq!(initial_score(&first(&doc, "div"), &config), 5.0);
    }

    #[test]
    fn test_paragraph_score_short_text_ignored() {
        assert_eq!(paragraph_score("Body text", &ScoreConfig::default()), None);
        assert_eq!(paragraph_score("   padded but short      ", &ScoreConfig::default()), None);
    }

    #[test]
    fn test_paragraph_score_counts_commas_and_length() {
        let config = ScoreConfig::default();
        let text = "One, two, three, and then a fairly long tail of ordinary prose text.";
        assert_eq!(paragraph_score(text, &config), Some(4.0));

        let long = "word ".repeat(100);
        assert_eq!(paragraph_score(&long, &config), Some(4.0));
    }

    #[test]
    fn test_ancestor_divider() {
        assert_eq!(ancestor_divider(0), 1.0);
        assert_eq!(ancestor_divider(1), 2.0);
        assert_eq!(ancestor_divider(2), 6.0);
        assert_eq!(ancestor_divider(4), 12.0);
    }

    #[test]
    fn test_is_paragraph_like() {
        let doc = Document::parse(r#"<div id="inline">Text <b>bold</b></div><div id="block"><p>Para</p></div>"#);
        assert!(is_paragraph_like(&first(&doc, "#inline")));
        assert!(!is_paragraph_like(&first(&doc, "#block")));
        assert!(is_paragraph_like(&first(&doc, "p")));
    }

    #[test]
    fn test_link_density_no_links() {
        let doc = Document::parse(r#"<div>Text content without any links.</div>"#);
        assert_eq!(link_density(&first(&doc, "div")), 0.0);
    }

    #[test]
    fn test_link_density_all_links() {
        let doc = Document::parse(r##"<div><a href="#">Link text</a></div>"##);
        assert_eq!(link_density(&first(&doc, "div")), 1.0);
    }

    #[test]
    fn test_link_density_mixed() {
        let doc = Document::parse(r##"<div>Some text <a href="#">link</a> more text</div>"##);
        let density = link_density(&first(&doc, "div"));
        assert!(density > 0.0 && density < 1.0);
    }

    #[test]
    fn test_unlikely_and_maybe_patterns() {
        assert!(UNLIKELY_CANDIDATES.is_match("site-sidebar"));
        assert!(UNLIKELY_CANDIDATES.is_match("Comment-Thread"));
        assert!(!UNLIKELY_CANDIDATES.is_match("entry-body"));
        assert!(MAYBE_CANDIDATE.is_match("main-column"));
    }
}
