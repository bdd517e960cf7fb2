//! Request-level error taxonomy.
//!
//! Every variant is terminal for the request — nothing is retried. The
//! client collapses all of these into one generic message; the detailed
//! reason still travels in the JSON `error` field.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("no file uploaded")]
    NoFile,

    #[error("uploaded data is not a supported image")]
    UnsupportedImage,

    #[error("provider request failed: {0}")]
    Upstream(String),

    #[error("no analysis found in provider response")]
    EmptyResult,

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AnalyzeError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzeError::NoFile | AnalyzeError::UnsupportedImage => StatusCode::BAD_REQUEST,
            AnalyzeError::Upstream(_) | AnalyzeError::EmptyResult | AnalyzeError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AnalyzeError::NoFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AnalyzeError::UnsupportedImage.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalyzeError::Upstream("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AnalyzeError::EmptyResult.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
