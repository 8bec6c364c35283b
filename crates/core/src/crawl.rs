//! Fetch, extract and optionally persist, as two named operations.
//!
//! [`Crawler::extract_only`] returns every extracted item inline.
//! [`Crawler::extract_and_persist`] additionally writes the items to the
//! output directory and returns a preview. Both share the extractor, so the
//! heuristic hard-fail and the selector soft-empty rules hold for each.

use serde::Serialize;
use url::Url;

use crate::extract::{ExtractionItem, LinkItem, extract_by_selector, extract_heuristic};
use crate::fetch::{FetchConfig, fetch_url, normalize_url};
use crate::parse::Document;
use crate::store::{OutputDir, PREVIEW_ROWS, Row, fetch_timestamp};
use crate::{GleanerError, Result};

/// Extracted items of either mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractedData {
    Heuristic(Vec<ExtractionItem>),
    Links(Vec<LinkItem>),
}

impl ExtractedData {
    pub fn len(&self) -> usize {
        match self {
            Self::Heuristic(items) => items.len(),
            Self::Links(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> Vec<Row> {
        match self {
            Self::Heuristic(items) => items.iter().map(Row::from).collect(),
            Self::Links(items) => items.iter().map(Row::from).collect(),
        }
    }

    fn truncated(&self, limit: usize) -> Self {
        match self {
            Self::Heuristic(items) => Self::Heuristic(items.iter().take(limit).cloned().collect()),
            Self::Links(items) => Self::Links(items.iter().take(limit).cloned().collect()),
        }
    }
}

/// What a crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub message: String,
    /// All items for [`Crawler::extract_only`]; a preview for [`Crawler::extract_and_persist`].
    pub data: ExtractedData,
    /// Path of the written file; `None` when nothing was persisted.
    pub filepath: Option<String>,
    /// Number of items extracted (and rows written when persisted).
    pub row_count: usize,
}

/// Extracts from an already parsed document.
///
/// Without a selector the heuristic rules apply and an empty outcome is
/// [`GleanerError::NoContent`]. With a selector an empty outcome is a
/// success carrying no items.
pub fn extract_document(doc: &Document, selector: Option<&str>) -> Result<(ExtractedData, String)> {
    match selector {
        None => {
            let items = extract_heuristic(doc).into_result()?;
            let message = format!("extracted {} item(s)", items.len());
            Ok((ExtractedData::Heuristic(items), message))
        }
        Some(selector) => {
            let selector = selector.trim();
            if selector.is_empty() {
                return Err(GleanerError::MissingField("element_tag"));
            }
            let extraction = extract_by_selector(doc, selector)?;
            let message = extraction.message();
            Ok((ExtractedData::Links(extraction.items), message))
        }
    }
}

/// Runs crawls against an injected fetch configuration and output directory.
#[derive(Debug, Clone, Default)]
pub struct Crawler {
    fetch: FetchConfig,
    output: OutputDir,
}

impl Crawler {
    pub fn new(fetch: FetchConfig, output: OutputDir) -> Self {
        Self { fetch, output }
    }

    pub fn output(&self) -> &OutputDir {
        &self.output
    }

    pub fn fetch_config(&self) -> &FetchConfig {
        &self.fetch
    }

    /// Fetches `url` and returns every extracted item, writing nothing.
    pub async fn extract_only(&self, url: &str, selector: Option<&str>) -> Result<CrawlReport> {
        let (url, data, message) = self.fetch_and_extract(url, selector).await?;
        tracing::info!(%url, items = data.len(), "extraction finished");

        let row_count = data.len();
        Ok(CrawlReport { message, data, filepath: None, row_count })
    }

    /// Fetches `url`, writes the extracted items to a CSV file and returns a preview.
    ///
    /// A soft-empty selector outcome writes no file.
    pub async fn extract_and_persist(&self, url: &str, selector: Option<&str>) -> Result<CrawlReport> {
        let (url, data, message) = self.fetch_and_extract(url, selector).await?;
        self.persist_extracted(&url, data, message)
    }

    /// Persists already extracted data for `url`.
    pub fn persist_extracted(&self, url: &str, data: ExtractedData, message: String) -> Result<CrawlReport> {
        if data.is_empty() {
            tracing::info!(%url, "nothing to persist");
            return Ok(CrawlReport { message, data, filepath: None, row_count: 0 });
        }

        let outcome = self.output.persist(url, &data.rows(), fetch_timestamp())?;
        Ok(CrawlReport {
            message: format!("{}; saved to {}", message, outcome.filename),
            data: data.truncated(PREVIEW_ROWS),
            filepath: Some(outcome.filepath.display().to_string()),
            row_count: outcome.row_count,
        })
    }

    async fn fetch_and_extract(&self, url: &str, selector: Option<&str>) -> Result<(String, ExtractedData, String)> {
        let url = normalize_url(url)?;
        if let Some(selector) = selector
            && selector.trim().is_empty()
        {
            return Err(GleanerError::MissingField("element_tag"));
        }

        tracing::info!(%url, selector = selector.unwrap_or("<heuristic>"), "crawl started");

        let page = fetch_url(&url, &self.fetch).await.inspect_err(|e| {
            tracing::error!(%url, error = %e, "fetch failed");
        })?;

        let doc = Document::parse_with_url(&page.body, base_url(&page.url));
        let (data, message) = extract_document(&doc, selector)?;

        Ok((url, data, message))
    }
}

fn base_url(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_fragment(None);
    base
}
