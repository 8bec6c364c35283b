use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use gleaner_core::{AnalysisRequest, ExtractedData, GleanerError, KeywordFrequencyResult, analyze};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::Result};

#[derive(Debug, Deserialize)]
struct CrawlRequest {
    url: Option<String>,
    /// CSS selector; selects generic extraction with persistence when present
    element_tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct InlineResponse {
    data: ExtractedData,
}

#[derive(Debug, Serialize)]
struct PersistedResponse {
    message: String,
    data: ExtractedData,
    filepath: Option<String>,
    row_count: usize,
}

#[derive(Debug, Serialize)]
struct CsvFilesResponse {
    files: Vec<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/crawl", post(crawl))
        .route("/api/csv_files", get(list_csv_files))
        .route("/api/visualize", post(visualize))
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn crawl(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CrawlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload?;
    let url = req.url.as_deref().ok_or(GleanerError::MissingField("url"))?;

    match req.element_tag.as_deref() {
        None => {
            let report = state.crawler.extract_only(url, None).await?;
            Ok(Json(InlineResponse { data: report.data }).into_response())
        }
        Some(selector) => {
            let report = state.crawler.extract_and_persist(url, Some(selector)).await?;
            Ok(Json(PersistedResponse {
                message: report.message,
                data: report.data,
                filepath: report.filepath,
                row_count: report.row_count,
            })
            .into_response())
        }
    }
}

async fn list_csv_files(State(state): State<Arc<AppState>>) -> Result<Json<CsvFilesResponse>> {
    let files = state.crawler.output().list_files()?;
    Ok(Json(CsvFilesResponse { files }))
}

async fn visualize(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<KeywordFrequencyResult>> {
    let Json(req) = payload?;
    let result = analyze(state.crawler.output(), &req)?;
    Ok(Json(result))
}
