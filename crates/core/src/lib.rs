pub mod analyze;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod parse;
pub mod store;

pub use analyze::{
    AnalysisKind, AnalysisRequest, KeywordFrequencyResult, analyze, count_occurrences, keyword_frequency,
    parse_keywords,
};
pub use crawl::{CrawlReport, Crawler, ExtractedData, extract_document};
pub use error::{ErrorKind, GleanerError, Result};
pub use extract::{
    ExtractionItem, ExtractionResult, LinkItem, SelectorExtraction, extract_by_selector, extract_heuristic,
};
pub use fetch::{FetchConfig, FetchedPage, decode_html, fetch_file, fetch_stdin, fetch_url, normalize_url};
pub use parse::{Document, Element};
pub use store::{OutputDir, PersistOutcome, Row, Table, derive_filename, fetch_timestamp};
