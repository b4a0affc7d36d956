//! Candidate scoring and article assembly.
//!
//! Paragraph-like elements hand their score up to a few ancestors; the best
//! scoring ancestor (after the link-density penalty) is the top candidate, and
//! qualifying siblings under the same parent are gathered around it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::parse::{Document, Element};
use crate::scoring::{ScoreConfig, ancestor_divider, initial_score, is_paragraph_like, link_density, paragraph_score};

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.( |$)").expect("valid regex"));

const PARAGRAPH_SELECTOR: &str = "p, pre, td, section, h2, h3, h4, h5, h6, div";

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Scoring weights
    pub score: ScoreConfig,
    /// Sibling score threshold (multiplier of top score)
    pub sibling_threshold: f64,
    /// Siblings never need more than this to join
    pub min_sibling_score: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { score: ScoreConfig::default(), sibling_threshold: 0.2, min_sibling_score: 10.0 }
    }
}

/// A candidate element with its score
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub element: Element<'a>,
    pub score: f64,
}

/// The result of content extraction, before post-processing
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Serialized HTML of the top candidate and its joined siblings
    pub content: String,
    /// Final score of the top candidate; `None` when the body was used
    pub top_score: Option<f64>,
    /// Number of top-level elements joined
    pub element_count: usize,
}

/// Score every candidate container in the document.
///
/// Returns candidates in the order they were first touched, with final
/// scores already scaled by `1 - link density`.
pub fn score_candidates<'a>(doc: &'a Document, config: &ScoreConfig) -> Vec<Candidate<'a>> {
    let mut scores: HashMap<Element<'a>, f64> = HashMap::new();
    let mut order: Vec<Element<'a>> = Vec::new();

    for paragraph in doc.select(PARAGRAPH_SELECTOR).unwrap_or_default() {
        if !is_paragraph_like(&paragraph) {
            continue;
        }
        let Some(points) = paragraph_score(&paragraph.text(), config) else {
            continue;
        };

        let ancestors = paragraph.ancestors().filter(|el| el.tag_name() != "html").take(config.max_ancestor_depth);
        for (level, ancestor) in ancestors.enumerate() {
            let entry = scores.entry(ancestor).or_insert_with(|| {
                order.push(ancestor);
                initial_score(&ancestor, config)
            });
            *entry += points / ancestor_divider(level);
        }
    }

    order
        .into_iter()
        .map(|element| {
            let raw = scores.get(&element).copied().unwrap_or_default();
            Candidate { element, score: raw * (1.0 - link_density(&element)) }
        })
        .collect()
}

/// Highest-scoring candidate; the earliest wins a tie.
fn select_top_candidate<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    candidates.iter().copied().fold(None, |best, candidate| match best {
        Some(best) if best.score >= candidate.score => Some(best),
        _ => Some(candidate),
    })
}

/// Select siblings that should be included with the top candidate
///
/// A sibling joins when:
/// - its score is at least `max(min_sibling_score, top * sibling_threshold)`,
///   with a bonus when it shares the top candidate's class
/// - or it is a `<p>` longer than 80 characters with link density below 0.25
/// - or it is a short `<p>` without links that ends a sentence
fn select_siblings<'a>(top: Candidate<'a>, candidates: &[Candidate<'a>], config: &ExtractConfig) -> Vec<Element<'a>> {
    let Some(parent) = top.element.parent() else {
        return vec![top.element];
    };

    let known: HashMap<Element<'a>, f64> = candidates.iter().map(|c| (c.element, c.score)).collect();
    let threshold = config.min_sibling_score.max(top.score * config.sibling_threshold);
    let top_class = top.element.attr("class").filter(|c| !c.is_empty());

    parent
        .children()
        .filter(|sibling| {
            if *sibling == top.element {
                return true;
            }

            let bonus = match (top_class, sibling.attr("class")) {
                (Some(a), Some(b)) if a == b => top.score * config.sibling_threshold,
                _ => 0.0,
            };
            if let Some(score) = known.get(sibling)
                && score + bonus >= threshold
            {
                return true;
            }

            if sibling.tag_name() != "p" {
                return false;
            }

            let text = sibling.text();
            let text = text.trim();
            let length = text.chars().count();
            let density = link_density(sibling);

            if length > 80 {
                density < 0.25
            } else {
                length > 0 && density == 0.0 && SENTENCE_END.is_match(text)
            }
        })
        .collect()
}

/// Extract the main content of a (preprocessed) document.
///
/// Without any scorable paragraph the whole `<body>` is the container, so
/// this only returns `None` for a document with no body at all.
pub fn extract_content(doc: &Document, config: &ExtractConfig) -> Option<ExtractedContent> {
    let candidates = score_candidates(doc, &config.score);

    let Some(top) = select_top_candidate(&candidates).filter(|top| top.element.tag_name() != "body") else {
        let body = doc.body()?;
        tracing::trace!("no top candidate, using body");
        return Some(ExtractedContent {
            content: body.inner_html(),
            top_score: None,
            element_count: body.children().count(),
        });
    };

    tracing::trace!(tag = top.element.tag_name(), score = top.score, candidates = candidates.len(), "top candidate");

    let siblings = select_siblings(top, &candidates, config);
    let content = siblings.iter().map(Element::outer_html).collect::<String>();

    Some(ExtractedContent { content, top_score: Some(top.score), element_count: siblings.len() })
}
