//! Error types for polis-dash
//!
//! Adapter and recipe failures are not handled by the session; they surface
//! here as a generic failure response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use polis_common::IdentityError;
use serde_json::json;
use thiserror::Error;

use crate::recipe::RecipeError;
use crate::source::SourceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Report could not be loaded
    #[error("Report load failed: {0}")]
    Source(#[from] SourceError),

    /// Recipe could not run on the loaded report
    #[error("Analysis failed: {0}")]
    Recipe(#[from] RecipeError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Source(SourceError::InvalidReportUrl { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Source(SourceError::ConversationNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Source(_) => StatusCode::BAD_GATEWAY,
            ApiError::Recipe(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Source(_) => "SOURCE_ERROR",
            ApiError::Recipe(_) => "RECIPE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
