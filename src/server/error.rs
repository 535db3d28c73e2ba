//! HTTP error mapping for the web layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::ConvertError;

/// Errors a handler can return; each maps to a status code and a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or unusable request (bad multipart, no PDFs, wrong type).
    #[error("{0}")]
    BadRequest(String),

    /// Unknown run id or expired artifact.
    #[error("{0}")]
    NotFound(String),

    /// Anything that should not leak details to the client.
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        // Batch-level failures only; per-file errors travel in the response
        // body, not here.
        ApiError::Internal(anyhow::Error::new(err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Internal(source) = &self {
            tracing::error!("request failed: {source:#}");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
