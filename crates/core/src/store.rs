//! CSV persistence, catalog and loading under a single output directory.
//!
//! [`OutputDir`] is a plain value: every component that reads or writes
//! extraction files receives one explicitly, so tests can point it at a
//! temporary directory.
//!
//! Files are named from the source host and the fetch time at second
//! resolution. Two writes for the same host within the same second share a
//! name and the later write replaces the earlier one.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde::ser::SerializeMap;

use crate::extract::{ExtractionItem, LinkItem};
use crate::{GleanerError, Result};

/// Directory used when no other location is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "crawled_data";

/// Rows included in a [`PersistOutcome`] preview.
pub const PREVIEW_ROWS: usize = 10;

const HOST_FRAGMENT_CHARS: usize = 50;
const FILE_EXTENSION: &str = "csv";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One output row: field names with values, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values laid out for `headers`: missing fields become empty cells and
    /// fields outside `headers` are dropped.
    fn values_for(&self, headers: &[String]) -> Vec<&str> {
        headers.iter().map(|header| self.get(header).unwrap_or_default()).collect()
    }

    fn matches_headers(&self, headers: &[String]) -> bool {
        self.len() == headers.len() && headers.iter().all(|header| self.get(header).is_some())
    }
}

impl Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl From<&ExtractionItem> for Row {
    fn from(item: &ExtractionItem) -> Self {
        Row::new().with("type", item.type_label.as_str()).with("content", item.content.as_str())
    }
}

impl From<&LinkItem> for Row {
    fn from(item: &LinkItem) -> Self {
        Row::new().with("text", item.text.as_str()).with("link", item.link.as_str())
    }
}

/// Result of writing a CSV file.
#[derive(Debug, Clone, Serialize)]
pub struct PersistOutcome {
    pub filename: String,
    pub filepath: PathBuf,
    /// First rows of the file, at most [`PREVIEW_ROWS`].
    pub preview: Vec<Row>,
    pub row_count: usize,
}

/// A persisted CSV file read back into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    /// Cells padded or cut to the header width.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Cells of the named column in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wall-clock time used to stamp persisted files.
pub fn fetch_timestamp() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Derives the file name for `url` fetched at `timestamp`.
///
/// The scheme is dropped, everything from the first `/` on is dropped, every
/// non-alphanumeric character becomes `_`, the fragment is cut to 50
/// characters and `_<YYYYMMDD_HHMMSS>.csv` is appended.
///
/// Distinct hosts are not guaranteed distinct names. `a-b.com` and `a.b.com`
/// both become `a_b_com`, and hosts sharing their first 50 characters are cut
/// to the same fragment. Within one second such hosts overwrite each other the
/// same way two requests to one host do.
///
/// ```rust
/// use chrono::NaiveDate;
/// use gleaner_core::store::derive_filename;
///
/// let ts = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 7).unwrap();
/// assert_eq!(
///     derive_filename("https://news.example.com:8080/a/b", ts),
///     "news_example_com_8080_20240309_140507.csv"
/// );
/// ```
pub fn derive_filename(url: &str, timestamp: NaiveDateTime) -> String {
    let without_scheme = url.find("://").map_or(url, |index| &url[index + 3..]);
    let host = without_scheme.split('/').next().unwrap_or(without_scheme);
    let fragment: String = host
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(HOST_FRAGMENT_CHARS)
        .collect();

    format!("{}_{}.{}", fragment, timestamp.format("%Y%m%d_%H%M%S"), FILE_EXTENSION)
}

/// Handle to the directory holding persisted extraction files.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl Default for OutputDir {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Writes `rows` to a new CSV file named from `url` and `timestamp`.
    ///
    /// The header is the field list of the first row. Later rows with a
    /// different field set are coerced to it: missing fields are written as
    /// empty cells and unknown fields are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GleanerError::NoContent`] when `rows` is empty; no file is
    /// created in that case.
    pub fn persist(&self, url: &str, rows: &[Row], timestamp: NaiveDateTime) -> Result<PersistOutcome> {
        let first = rows.first().ok_or(GleanerError::NoContent)?;
        let headers: Vec<String> = first.keys().map(String::from).collect();

        self.ensure()?;
        let filename = derive_filename(url, timestamp);
        let filepath = self.root.join(&filename);

        let mut file = File::create(&filepath)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&headers)?;
        for (index, row) in rows.iter().enumerate() {
            if !row.matches_headers(&headers) {
                tracing::warn!(
                    file = %filename,
                    row = index,
                    expected = ?headers,
                    found = ?row.keys().collect::<Vec<_>>(),
                    "row fields differ from header, coercing"
                );
            }
            writer.write_record(row.values_for(&headers))?;
        }
        writer.flush()?;

        tracing::info!(file = %filepath.display(), rows = rows.len(), "persisted extraction");

        Ok(PersistOutcome {
            filename,
            filepath,
            preview: rows.iter().take(PREVIEW_ROWS).cloned().collect(),
            row_count: rows.len(),
        })
    }

    /// Lists names of CSV files in the directory, sorted.
    ///
    /// A directory that does not exist yet holds no files.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(FILE_EXTENSION));
            if is_csv && let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Resolves a bare file name inside the directory.
    ///
    /// # Errors
    ///
    /// - [`GleanerError::MissingField`] for a blank name
    /// - [`GleanerError::InvalidFilename`] for anything other than a single
    ///   plain path component
    /// - [`GleanerError::FileNotFound`] when no such file exists
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let name = filename.trim();
        if name.is_empty() {
            return Err(GleanerError::MissingField("filename"));
        }

        let mut components = Path::new(name).components();
        let single_normal = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
        if !single_normal || name.contains(['/', '\\']) {
            return Err(GleanerError::InvalidFilename(name.to_string()));
        }

        let path = self.root.join(name);
        if !path.is_file() {
            return Err(GleanerError::FileNotFound(path));
        }

        Ok(path)
    }

    /// Loads a persisted file.
    ///
    /// # Errors
    ///
    /// Returns [`GleanerError::EmptyTable`] when the file has no header or no
    /// data rows, and [`GleanerError::Csv`] when it cannot be read as CSV.
    pub fn load_table(&self, filename: &str) -> Result<Table> {
        let path = self.resolve(filename)?;
        let bytes = fs::read(&path)?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(content);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(String::is_empty) {
            return Err(GleanerError::EmptyTable(filename.trim().to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let mut row: Vec<String> = record?.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(GleanerError::EmptyTable(filename.trim().to_string()));
        }

        Ok(Table { headers, rows })
    }
}
