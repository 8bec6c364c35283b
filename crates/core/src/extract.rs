//! Fragment extraction from parsed documents.
//!
//! Two modes share the [`Document`] wrapper:
//!
//! - [`extract_heuristic`] applies fixed rules (title, first heading, leading
//!   paragraphs) and treats an empty outcome as a failure.
//! - [`extract_by_selector`] runs a caller-supplied CSS selector and treats an
//!   empty outcome as a valid, soft-empty success.

use serde::Serialize;
use url::Url;

use crate::parse::Document;
use crate::{GleanerError, Result};

/// Paragraphs considered by heuristic extraction.
pub const PARAGRAPH_LIMIT: usize = 3;

/// Characters kept from a paragraph before truncation.
pub const PARAGRAPH_PREVIEW_CHARS: usize = 100;

const TRUNCATION_MARKER: &str = "...";
const NOT_FOUND: &str = "not found";
const HEADING_NOT_FOUND: &str = "not found (H1, H2)";

/// Heading candidates tried in order; the first non-empty match wins.
const HEADING_CANDIDATES: &[(&str, &str)] = &[("h1", "first H1"), ("h2", "first H2")];

/// A labeled fragment produced by heuristic extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionItem {
    #[serde(rename = "type")]
    pub type_label: String,
    pub content: String,
}

impl ExtractionItem {
    pub fn new(type_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self { type_label: type_label.into(), content: content.into() }
    }
}

/// Outcome of heuristic extraction.
///
/// Serializes as `{"data": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionResult {
    Data(Vec<ExtractionItem>),
    Error(String),
}

impl ExtractionResult {
    /// Converts into a `Result`, mapping the error arm to [`GleanerError::NoContent`].
    pub fn into_result(self) -> Result<Vec<ExtractionItem>> {
        match self {
            Self::Data(items) => Ok(items),
            Self::Error(_) => Err(GleanerError::NoContent),
        }
    }
}

/// A fragment produced by selector extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkItem {
    pub text: String,
    /// Link target for anchors; empty for every other element.
    pub link: String,
}

/// Outcome of selector extraction.
#[derive(Debug, Clone)]
pub struct SelectorExtraction {
    pub selector: String,
    /// Number of nodes the selector matched, including those skipped for empty text.
    pub matched: usize,
    pub items: Vec<LinkItem>,
}

impl SelectorExtraction {
    /// Human-readable summary; the wording separates the two soft-empty cases.
    pub fn message(&self) -> String {
        if !self.items.is_empty() {
            format!("extracted {} item(s) with selector '{}'", self.items.len(), self.selector)
        } else if self.matched == 0 {
            format!("no elements matched selector '{}'", self.selector)
        } else {
            format!("elements matched selector '{}' but none contained text", self.selector)
        }
    }
}

/// Extracts the page title, main heading and leading paragraphs.
///
/// # Example
///
/// ```rust
/// use gleaner_core::extract::{ExtractionItem, ExtractionResult, extract_heuristic};
/// use gleaner_core::parse::Document;
///
/// let doc = Document::parse("<title>Example</title>");
/// assert_eq!(
///     extract_heuristic(&doc),
///     ExtractionResult::Data(vec![
///         ExtractionItem::new("page title", "Example"),
///         ExtractionItem::new("main heading", "not found (H1, H2)"),
///     ])
/// );
/// ```
pub fn extract_heuristic(doc: &Document) -> ExtractionResult {
    let mut items = Vec::new();

    match first_string(doc, "title") {
        Some(title) => items.push(ExtractionItem::new("page title", title)),
        None => items.push(ExtractionItem::new("page title", NOT_FOUND)),
    }

    let heading = HEADING_CANDIDATES
        .iter()
        .find_map(|(selector, label)| first_string(doc, selector).map(|text| ExtractionItem::new(*label, text)));
    items.push(heading.unwrap_or_else(|| ExtractionItem::new("main heading", HEADING_NOT_FOUND)));

    if let Ok(paragraphs) = doc.select_limit("p", PARAGRAPH_LIMIT) {
        for (index, paragraph) in paragraphs.iter().enumerate() {
            let Some(text) = paragraph.string().map(|s| s.trim().to_string()) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }
            items.push(ExtractionItem::new(format!("paragraph content #{}", index + 1), truncate(&text)));
        }
    }

    if items.is_empty() {
        tracing::warn!("no extractable information found");
        return ExtractionResult::Error(GleanerError::NoContent.to_string());
    }

    ExtractionResult::Data(items)
}

/// Trimmed string of the first element matching `selector`; whitespace-only counts as absent.
fn first_string(doc: &Document, selector: &str) -> Option<String> {
    let element = doc.first(selector).ok().flatten()?;
    let text = element.string()?;
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(PARAGRAPH_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Extracts `{text, link}` items for every node matching `selector`.
///
/// Matched nodes whose normalized text is empty are skipped. Relative anchor
/// targets are resolved against the document's base URL when it is known.
///
/// # Errors
///
/// Returns [`GleanerError::InvalidSelector`] for malformed selectors. Zero
/// matches is not an error.
pub fn extract_by_selector(doc: &Document, selector: &str) -> Result<SelectorExtraction> {
    let elements = doc.select(selector)?;
    let matched = elements.len();

    let items = elements
        .iter()
        .filter_map(|element| {
            let text = element.normalized_text();
            if text.is_empty() {
                return None;
            }

            let link = if element.tag_name() == "a" {
                element.attr("href").map(|href| resolve_link(doc.base_url(), href)).unwrap_or_default()
            } else {
                String::new()
            };

            Some(LinkItem { text, link })
        })
        .collect::<Vec<_>>();

    tracing::debug!(selector, matched, kept = items.len(), "selector extraction finished");

    Ok(SelectorExtraction { selector: selector.to_string(), matched, items })
}

fn resolve_link(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    match base {
        Some(base) => base.join(href).map(String::from).unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn heuristic(html: &str) -> Vec<ExtractionItem> {
        extract_heuristic(&Document::parse(html)).into_result().unwrap()
    }

    #[test]
    fn test_title_only_page() {
        let items = heuristic("<html><head><title>Example</title></head><body></body></html>");
        assert_eq!(
            items,
            vec![
                ExtractionItem::new("page title", "Example"),
                ExtractionItem::new("main heading", "not found (H1, H2)"),
            ]
        );
    }

    #[test]
    fn test_title_is_trimmed_and_first() {
        let items = heuristic("<title>\n   Spaced Title  \n</title><h1>Head</h1>");
        assert_eq!(items[0], ExtractionItem::new("page title", "Spaced Title"));
    }

    #[test]
    fn test_missing_title_placeholder() {
        let items = heuristic("<body><h1>Head</h1></body>");
        assert_eq!(items[0], ExtractionItem::new("page title", "not found"));
        assert_eq!(items[1], ExtractionItem::new("first H1", "Head"));
    }

    #[rstest]
    #[case("<h1>Main</h1><h2>Sub</h2>", "first H1", "Main")]
    #[case("<h2>Sub</h2>", "first H2", "Sub")]
    #[case("<h1>   </h1><h2>Sub</h2>", "first H2", "Sub")]
    #[case("<h1><span>a</span><span>b</span></h1><h2>Sub</h2>", "first H2", "Sub")]
    #[case("<h1><b>Bold heading</b></h1>", "first H1", "Bold heading")]
    #[case("<p>Only a paragraph</p>", "main heading", "not found (H1, H2)")]
    fn test_heading_fallback(#[case] body: &str, #[case] label: &str, #[case] content: &str) {
        let items = heuristic(&format!("<title>T</title>{}", body));
        assert_eq!(items[1], ExtractionItem::new(label, content));
    }

    #[test]
    fn test_only_first_h1_is_considered() {
        let items = heuristic("<title>T</title><h1></h1><h1>Second</h1><h2>Sub</h2>");
        assert_eq!(items[1], ExtractionItem::new("first H2", "Sub"));
    }

    #[test]
    fn test_paragraphs_are_capped_and_numbered() {
        let items = heuristic("<title>T</title><p>one</p><p><b>x</b> y</p><p>three</p><p>four</p>");
        let paragraphs: Vec<_> = items.iter().skip(2).collect();
        assert_eq!(
            paragraphs,
            vec![
                &ExtractionItem::new("paragraph content #1", "one"),
                &ExtractionItem::new("paragraph content #3", "three"),
            ]
        );
    }

    #[test]
    fn test_paragraph_truncation() {
        let long = "가".repeat(150);
        let exact = "b".repeat(100);
        let items = heuristic(&format!("<title>T</title><p>{}</p><p>{}</p>", long, exact));

        assert_eq!(items[2].content, format!("{}...", "가".repeat(100)));
        assert_eq!(items[3].content, exact);
    }

    #[test]
    fn test_heading_slot_never_filled_by_paragraph() {
        let items = heuristic("<p>Paragraph text</p>");
        assert_eq!(items[1].type_label, "main heading");
        assert_eq!(items[2].type_label, "paragraph content #1");
    }

    #[test]
    fn test_result_serialization() {
        let ok = ExtractionResult::Data(vec![ExtractionItem::new("page title", "Example")]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"data": [{"type": "page title", "content": "Example"}]})
        );

        let err = ExtractionResult::Error("nothing".into());
        assert_eq!(serde_json::to_value(&err).unwrap(), serde_json::json!({"error": "nothing"}));
        assert!(matches!(err.into_result(), Err(GleanerError::NoContent)));
    }

    #[test]
    fn test_selector_extracts_text_and_links() {
        let doc = Document::parse_with_url(
            r#"<ul>
                <li class="item"><a class="x" href="/a">  First
                    link </a></li>
                <li class="item"><a class="x" href="https://other.org/b">Second</a></li>
                <li class="item"><a class="x">No href</a></li>
            </ul>
            <span class="x">Plain</span>"#,
            Url::parse("https://example.com/list").unwrap(),
        );

        let extraction = extract_by_selector(&doc, ".x").unwrap();
        assert_eq!(extraction.matched, 4);
        assert_eq!(
            extraction.items,
            vec![
                LinkItem { text: "First link".into(), link: "https://example.com/a".into() },
                LinkItem { text: "Second".into(), link: "https://other.org/b".into() },
                LinkItem { text: "No href".into(), link: String::new() },
                LinkItem { text: "Plain".into(), link: String::new() },
            ]
        );
        assert!(extraction.message().contains("extracted 4 item(s)"));
    }

    #[test]
    fn test_selector_without_base_keeps_raw_href() {
        let doc = Document::parse(r#"<a href="/relative">go</a>"#);
        let extraction = extract_by_selector(&doc, "a").unwrap();
        assert_eq!(extraction.items[0].link, "/relative");
    }

    #[test]
    fn test_selector_zero_matches_is_soft_empty() {
        let doc = Document::parse("<p>text</p>");
        let extraction = extract_by_selector(&doc, "article").unwrap();
        assert!(extraction.items.is_empty());
        assert_eq!(extraction.message(), "no elements matched selector 'article'");
    }

    #[test]
    fn test_selector_empty_text_is_soft_empty() {
        let doc = Document::parse("<div class='c'>  </div><div class='c'><img src='a.png'></div>");
        let extraction = extract_by_selector(&doc, "div.c").unwrap();
        assert!(extraction.items.is_empty());
        assert_eq!(extraction.matched, 2);
        assert_eq!(extraction.message(), "elements matched selector 'div.c' but none contained text");
    }

    #[test]
    fn test_selector_invalid() {
        let doc = Document::parse("<p>text</p>");
        assert!(matches!(
            extract_by_selector(&doc, "p[["),
            Err(GleanerError::InvalidSelector { .. })
        ));
    }
}
