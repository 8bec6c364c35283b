//! Content fetching from URLs, files, and stdin.
//!
//! Remote pages are retrieved with a single timed GET carrying a desktop
//! browser identity. Failures are classified into timeouts, non-success
//! statuses and transport errors; nothing is retried.
//!
//! Bodies are read as bytes and decoded by [`decode_html`], which honours the
//! declared encoding so legacy pages (EUC-KR, Shift_JIS, windows-1252) reach
//! the parser intact.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{GleanerError, Result};

/// Bytes scanned for an in-document charset declaration.
const SNIFF_BYTES: usize = 1024;

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    /// HTTP status code (always a success code).
    pub status: u16,
    /// Decoded response body.
    pub body: String,
}

/// Normalizes a caller-supplied URL.
///
/// Blank input is a missing field. Input without a scheme is defaulted to
/// `http://`. Only `http` and `https` are accepted.
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GleanerError::MissingField("url"));
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        return Err(GleanerError::InvalidUrl(format!(
            "'{}' must use http:// or https://",
            trimmed
        )));
    } else {
        format!("http://{}", trimmed)
    };

    let parsed = Url::parse(&candidate).map_err(|e| GleanerError::InvalidUrl(format!("'{}': {}", trimmed, e)))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(GleanerError::InvalidUrl(format!("'{}' has no host", trimmed)));
    }

    Ok(candidate)
}

/// Fetches HTML content from a URL.
///
/// The body is decoded with [`decode_html`] using the response's
/// `Content-Type` header.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<FetchedPage> {
    let parsed_url = Url::parse(url).map_err(|e| GleanerError::InvalidUrl(e.to_string()))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(GleanerError::Http)?;

    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            GleanerError::Timeout { url: url.to_string(), timeout: config.timeout }
        } else {
            GleanerError::Http(e)
        }
    };

    tracing::debug!(url, timeout = config.timeout, "sending request");

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(GleanerError::HttpStatus { url: url.to_string(), status: status.as_u16() });
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await.map_err(classify)?;
    let body = decode_html(&bytes, content_type.as_deref());

    tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "response received");

    Ok(FetchedPage { url: final_url, status: status.as_u16(), body })
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(GleanerError::FileNotFound(path_buf))
    } else {
        let bytes = fs::read(&path_buf)?;
        Ok(decode_html(&bytes, None))
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).map_err(GleanerError::from)?;

    Ok(decode_html(&buffer, None))
}

/// Decodes an HTML body to UTF-8.
///
/// The encoding is the first one found among:
///
/// 1. the `charset` parameter of `content_type`
/// 2. a byte-order mark
/// 3. a `<meta charset>` or `http-equiv` declaration in the first 1024 bytes
/// 4. UTF-8
///
/// Undecodable sequences become U+FFFD.
///
/// ```rust
/// use gleaner_core::fetch::decode_html;
///
/// let html = b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>";
/// assert!(decode_html(html, None).contains("Café"));
/// ```
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(declared_encoding)
        .or_else(|| Encoding::for_bom(bytes).map(|(encoding, _)| encoding))
        .or_else(|| {
            let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_BYTES)]);
            declared_encoding(&head).map(Encoding::output_encoding)
        })
        .unwrap_or(UTF_8);

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "body contained undecodable bytes");
    }

    text.into_owned()
}

/// First recognised `charset=<label>` in `text`.
fn declared_encoding(text: &str) -> Option<&'static Encoding> {
    let lower = text.to_ascii_lowercase();
    lower.match_indices("charset").find_map(|(index, needle)| {
        let rest = lower[index + needle.len()..].trim_start();
        let rest = rest.strip_prefix('=')?.trim_start().trim_start_matches(['"', '\'']);
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
            .unwrap_or(rest.len());
        Encoding::for_label(rest[..end].as_bytes())
    })
}
