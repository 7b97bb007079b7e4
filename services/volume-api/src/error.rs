//! API error types and their HTTP mappings.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use volume_store::VolumeStoreError;

/// Errors surfaced by the volume API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A query parameter failed to parse or validate.
    #[error("Invalid input parameters: {field}={value}: {reason}")]
    InvalidParameter {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The three component reads disagreed on shape.
    #[error("component shapes differ: {dataset} returned {got:?}, expected {expected:?}")]
    ShapeMismatch {
        dataset: &'static str,
        expected: [u64; 3],
        got: [u64; 3],
    },

    /// The envelope could not be encoded.
    #[error("failed to encode response: {0}")]
    Encoding(String),

    /// A dataset read failed.
    #[error(transparent)]
    Backend(#[from] VolumeStoreError),
}

impl ApiError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::ShapeMismatch { .. } | Self::Encoding(_) | Self::Backend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
