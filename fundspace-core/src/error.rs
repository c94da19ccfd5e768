//! Error types shared across the workspace

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum FundspaceError {
    /// The caller sent a request that cannot be served
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Anything the server did not anticipate, such as a panicking handler
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FundspaceError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        FundspaceError::InvalidRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        FundspaceError::Internal(msg.into())
    }

    /// Whether the error is caused by the caller rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, FundspaceError::InvalidRequest(_))
    }
}

/// Result type alias for workspace operations
pub type FundspaceResult<T> = Result<T, FundspaceError>;
