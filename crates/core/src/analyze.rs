//! Statistics over persisted extraction files.
//!
//! The only analysis today is keyword frequency: every cell of the `text`
//! column is joined into one lower-cased blob and each keyword is counted as
//! a non-overlapping substring, scanning left to right.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::OutputDir;
use crate::{GleanerError, Result};

/// Column aggregated by keyword analysis.
pub const TEXT_COLUMN: &str = "text";

/// Supported analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    KeywordFrequency,
}

impl FromStr for AnalysisKind {
    type Err = GleanerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "keyword_frequency" => Ok(Self::KeywordFrequency),
            other => Err(GleanerError::UnsupportedAnalysis(other.to_string())),
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeywordFrequency => f.write_str("keyword_frequency"),
        }
    }
}

/// An analysis request as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    pub filename: Option<String>,
    pub analysis_type: Option<String>,
    /// Comma-separated keywords.
    pub keywords: Option<String>,
}

/// Keyword counts aligned by index with their keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordFrequencyResult {
    pub keywords: Vec<String>,
    pub counts: Vec<usize>,
    pub title: String,
}

/// Splits a comma-separated keyword list.
///
/// Each entry is trimmed and lower-cased; empty entries are dropped.
/// Duplicates are kept as separate entries.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
///
/// After a match the scan resumes right after it, so `"aa"` occurs twice in
/// `"aaaa"` and once in `"aaa"`. An empty needle counts as zero.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Counts each keyword in the concatenated, lower-cased `texts`.
pub fn keyword_frequency<'a>(texts: impl IntoIterator<Item = &'a str>, keywords: &[String]) -> Vec<usize> {
    let blob = texts.into_iter().collect::<Vec<_>>().join(" ").to_lowercase();
    keywords.iter().map(|keyword| count_occurrences(&blob, keyword)).collect()
}

/// Runs the requested analysis against a file in `dir`.
///
/// Checks run in order and the first failure is returned:
///
/// 1. `filename` present, else [`GleanerError::MissingField`]
/// 2. `analysis_type` present, else [`GleanerError::MissingField`]
/// 3. the file exists, else [`GleanerError::FileNotFound`]
/// 4. the file is a non-empty table, else [`GleanerError::EmptyTable`]
/// 5. the analysis is supported, else [`GleanerError::UnsupportedAnalysis`]
/// 6. the `text` column exists, else [`GleanerError::MissingColumn`]
pub fn analyze(dir: &OutputDir, request: &AnalysisRequest) -> Result<KeywordFrequencyResult> {
    let filename = required(request.filename.as_deref(), "filename")?;
    let analysis_type = required(request.analysis_type.as_deref(), "analysis_type")?;

    let table = dir.load_table(filename)?;

    match analysis_type.parse::<AnalysisKind>()? {
        AnalysisKind::KeywordFrequency => {
            let texts = table.column(TEXT_COLUMN).ok_or_else(|| GleanerError::MissingColumn {
                filename: filename.to_string(),
                column: TEXT_COLUMN.to_string(),
            })?;

            let keywords = parse_keywords(request.keywords.as_deref().unwrap_or_default());
            let counts = keyword_frequency(texts, &keywords);

            tracing::info!(file = filename, rows = table.len(), keywords = keywords.len(), "keyword frequency computed");

            Ok(KeywordFrequencyResult { keywords, counts, title: format!("Keyword frequency in {}", filename) })
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(GleanerError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn request(filename: &str, kind: &str, keywords: &str) -> AnalysisRequest {
        AnalysisRequest {
            filename: Some(filename.to_string()),
            analysis_type: Some(kind.to_string()),
            keywords: Some(keywords.to_string()),
        }
    }

    fn dir_with(files: &[(&str, &str)]) -> (TempDir, OutputDir) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        let dir = OutputDir::new(tmp.path());
        (tmp, dir)
    }

    #[rstest]
    #[case("aaaa", "aa", 2)]
    #[case("aaa", "aa", 1)]
    #[case("ababab", "ab", 3)]
    #[case("hello world", "xyz", 0)]
    #[case("anything", "", 0)]
    fn test_count_occurrences(#[case] haystack: &str, #[case] needle: &str, #[case] expected: usize) {
        assert_eq!(count_occurrences(haystack, needle), expected);
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_keywords(" World, HELLO ,,  , world"), vec!["world", "hello", "world"]);
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ,").is_empty());
    }

    #[test]
    fn test_analysis_kind_parse() {
        assert_eq!("keyword_frequency".parse::<AnalysisKind>().unwrap(), AnalysisKind::KeywordFrequency);
        assert!(matches!("word_cloud".parse::<AnalysisKind>(), Err(GleanerError::UnsupportedAnalysis(_))));
        assert_eq!(AnalysisKind::KeywordFrequency.to_string(), "keyword_frequency");
    }

    #[test]
    fn test_keyword_frequency_scenario() {
        let (_tmp, dir) = dir_with(&[("pages.csv", "\u{feff}text,link\nhello world,\nworld hello world,\n")]);
        let result = analyze(&dir, &request("pages.csv", "keyword_frequency", "world, hello")).unwrap();

        assert_eq!(result.keywords, vec!["world", "hello"]);
        assert_eq!(result.counts, vec![3, 2]);
        assert_eq!(result.title, "Keyword frequency in pages.csv");
    }

    #[test]
    fn test_keyword_frequency_is_case_insensitive_and_keeps_duplicates() {
        let (_tmp, dir) = dir_with(&[("pages.csv", "text\nRust is RUST\n,\nrusty\n")]);
        let result = analyze(&dir, &request("pages.csv", "keyword_frequency", "Rust,rust")).unwrap();

        assert_eq!(result.keywords, vec!["rust", "rust"]);
        assert_eq!(result.counts, vec![3, 3]);
    }

    #[test]
    fn test_blob_joins_cells_with_single_space() {
        let texts = ["end", "start"];
        assert_eq!(keyword_frequency(texts, &["d s".to_string()]), vec![1]);
    }

    #[test]
    fn test_missing_keywords_yields_empty_result() {
        let (_tmp, dir) = dir_with(&[("pages.csv", "text\nhello\n")]);
        let req = AnalysisRequest { keywords: None, ..request("pages.csv", "keyword_frequency", "") };
        let result = analyze(&dir, &req).unwrap();
        assert!(result.keywords.is_empty());
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_precondition_order() {
        let (_tmp, dir) = dir_with(&[("empty.csv", ""), ("nolabel.csv", "type,content\npage title,x\n")]);

        let missing = AnalysisRequest { filename: None, ..request("x", "bogus", "a") };
        assert!(matches!(analyze(&dir, &missing), Err(GleanerError::MissingField("filename"))));

        let no_type = AnalysisRequest { analysis_type: Some(" ".into()), ..request("absent.csv", "", "a") };
        assert!(matches!(analyze(&dir, &no_type), Err(GleanerError::MissingField("analysis_type"))));

        assert!(matches!(
            analyze(&dir, &request("absent.csv", "bogus", "a")),
            Err(GleanerError::FileNotFound(_))
        ));
        assert!(matches!(
            analyze(&dir, &request("empty.csv", "bogus", "a")),
            Err(GleanerError::EmptyTable(_))
        ));
        assert!(matches!(
            analyze(&dir, &request("nolabel.csv", "bogus", "a")),
            Err(GleanerError::UnsupportedAnalysis(_))
        ));
        assert!(matches!(
            analyze(&dir, &request("nolabel.csv", "keyword_frequency", "a")),
            Err(GleanerError::MissingColumn { .. })
        ));
    }
}
