//! Mapping of service errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use fundspace_core::{ErrorResponse, FundspaceError};

/// Message returned for any failure that is not the caller's fault
pub const GENERIC_FAILURE: &str = "Failed to process feeds";

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(FundspaceError);

impl From<FundspaceError> for ApiError {
    fn from(err: FundspaceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            FundspaceError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(GENERIC_FAILURE)),
                )
                    .into_response()
            }
        }
    }
}
