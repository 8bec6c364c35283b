//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the tree using CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{GleanerError, Result};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors. It optionally remembers the URL it was fetched from
/// so relative links can be resolved.
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is lenient: malformed markup still yields a navigable tree.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), base_url: None }
    }

    /// Parses HTML and records the URL it came from.
    pub fn parse_with_url(html: &str, base_url: Url) -> Self {
        Self { html: Html::parse_document(html), base_url: Some(base_url) }
    }

    /// Gets the base URL the document was fetched from.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`GleanerError::InvalidSelector`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gleaner_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// Selects at most `limit` elements.
    pub fn select_limit(&'_ self, selector: &str, limit: usize) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).take(limit).map(|element| Element { element }).collect())
    }

    /// Returns the first element matching `selector`, if any.
    pub fn first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|element| Element { element }))
    }

    /// Gets the raw text of the first `<title>` element.
    pub fn title(&self) -> Option<String> {
        self.first("title").ok().flatten().map(|el| el.text())
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| GleanerError::InvalidSelector { selector: selector.to_string(), reason: e.to_string() })
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use gleaner_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the concatenation of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets descendant text with runs of whitespace collapsed to one space
    /// and both ends trimmed.
    pub fn normalized_text(&self) -> String {
        self.element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
    }

    /// Gets the element's own string.
    ///
    /// A string exists only when the element has exactly one child and that
    /// child is a text node, or an element which itself has a string. An
    /// element with several children, or with markup but no single text
    /// path, has no string.
    pub fn string(&self) -> Option<String> {
        own_string(self.element)
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name (e.g., "div", "a", "span").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }
}

fn own_string(element: ElementRef<'_>) -> Option<String> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    if let Some(text) = only.value().as_text() {
        return Some(String::from(&**text));
    }

    ElementRef::wrap(only).and_then(own_string)
}
