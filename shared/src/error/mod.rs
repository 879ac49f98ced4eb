use aws_sdk_dynamodb::error::SdkError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::{CallableError, ErrorResponse};

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Caller-visible failure kinds shared by both endpoints.
///
/// Every collaborator failure is re-signalled as one of these before it leaves
/// an operation; the wire code comes from [`ServiceError::code`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Unknown(String),
}

impl ServiceError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        ServiceError::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        ServiceError::Unknown(msg.into())
    }

    /// Machine-readable code sent in the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::NotFound(_) => "not-found",
            ServiceError::InvalidArgument(_) => "invalid-argument",
            ServiceError::Unknown(_) => "unknown",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper function to map general DynamoDB errors
pub fn map_dynamo_error<E, R>(operation: &str, err: SdkError<E, R>) -> ServiceError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    ServiceError::Unknown(format!(
        "DynamoDB {} error: {}",
        operation,
        aws_sdk_dynamodb::error::DisplayErrorContext(err)
    ))
}

// Helper function to map SNS errors
pub fn map_sns_error<E, R>(operation: &str, err: aws_sdk_sns::error::SdkError<E, R>) -> ServiceError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    ServiceError::Unknown(format!(
        "SNS {} error: {}",
        operation,
        aws_sdk_sns::error::DisplayErrorContext(err)
    ))
}

impl From<serde_dynamo::Error> for ServiceError {
    fn from(err: serde_dynamo::Error) -> Self {
        ServiceError::Unknown(format!("DynamoDB serialization error: {}", err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Unknown(format!("JSON serialization error: {}", err))
    }
}

// Error handler for both services
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ServiceError::Unknown(msg) => tracing::error!("Unknown error: {}", msg),
            other => tracing::warn!("{} error: {}", other.code(), other),
        }

        let body = ErrorResponse {
            error: CallableError {
                status: self.code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
