use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::document::ClientError;

/// Domain error kinds surfaced by the repository.
///
/// The repository is the only place that builds these from engine outcomes;
/// upper layers only map them to responses.
#[derive(Debug, Error)]
pub enum ItemError {
    /// Item id absent at the engine
    #[error("item not found with given id {0}")]
    NotFound(String),

    #[error("{0} timed out")]
    Timeout(String),

    /// Stored document could not be read back as an item
    #[error("error when trying to parse response: {0}")]
    Parse(String),

    #[error("{operation} failed: {source}")]
    Failure {
        operation: &'static str,
        #[source]
        source: ClientError,
    },
}

pub type ItemResult<T> = Result<T, ItemError>;

impl ItemError {
    /// Classify a client error raised during `operation`.
    pub(crate) fn from_client(operation: &'static str, err: ClientError) -> Self {
        match err {
            ClientError::Timeout { .. } => ItemError::Timeout(operation.to_string()),
            ClientError::Decode(msg) => ItemError::Parse(msg),
            source => ItemError::Failure { operation, source },
        }
    }
}

/// Convert ItemError to AppError for standardized error responses
impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => {
                AppError::NotFound(format!("item not found with given id {}", id))
            }
            ItemError::Timeout(operation) => {
                tracing::warn!(operation = %operation, "Item operation timed out");
                AppError::RequestTimeout("request timeout".to_string())
            }
            ItemError::Parse(details) => {
                tracing::error!(details = %details, "Stored item could not be parsed");
                AppError::InternalServerError("error when trying to parse response".to_string())
            }
            ItemError::Failure { operation, source } => {
                tracing::error!(operation, error = %source, "Item operation failed");
                AppError::InternalServerError("internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
