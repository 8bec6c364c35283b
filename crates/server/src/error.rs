use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gleaner_core::{ErrorKind, GleanerError};
use serde_json::json;

const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred while processing the request";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] GleanerError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err.kind() {
                ErrorKind::Validation | ErrorKind::Parse | ErrorKind::Schema | ErrorKind::Unsupported => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Network if matches!(err, GleanerError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Network => StatusCode::BAD_GATEWAY,
                ErrorKind::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "unhandled error");
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GleanerError::MissingField("url"), StatusCode::BAD_REQUEST),
            (GleanerError::FileNotFound(PathBuf::from("a.csv")), StatusCode::NOT_FOUND),
            (GleanerError::EmptyTable("a.csv".into()), StatusCode::BAD_REQUEST),
            (
                GleanerError::MissingColumn { filename: "a.csv".into(), column: "text".into() },
                StatusCode::BAD_REQUEST,
            ),
            (GleanerError::UnsupportedAnalysis("pie".into()), StatusCode::BAD_REQUEST),
            (GleanerError::Timeout { url: "http://a".into(), timeout: 10 }, StatusCode::GATEWAY_TIMEOUT),
            (GleanerError::HttpStatus { url: "http://a".into(), status: 500 }, StatusCode::BAD_GATEWAY),
            (GleanerError::NoContent, StatusCode::UNPROCESSABLE_ENTITY),
            (GleanerError::Io(std::io::Error::other("disk")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_unknown_error_is_internal() {
        let response = ApiError::from(GleanerError::Io(std::io::Error::other("secret path"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
