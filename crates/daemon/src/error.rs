use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use control_plane_core::{
    api::{ErrorBody, ErrorCode},
    validation::ValidationError,
    QueueError, RegistryError,
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request body too large: {0}")]
    PayloadTooLarge(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, field) = match self {
            ApiError::Validation(v) => (ErrorCode::InvalidInput, v.field().map(str::to_string)),
            ApiError::Unauthorized(_) => (ErrorCode::Unauthorized, None),
            ApiError::NotFound(_) => (ErrorCode::NotFound, None),
            ApiError::Conflict(_) => (ErrorCode::Conflict, None),
            ApiError::PayloadTooLarge(_) => (ErrorCode::InvalidInput, None),
            ApiError::Internal(_) => (ErrorCode::Internal, None),
        };
        ErrorBody {
            error,
            message: self.to_string(),
            field,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::Validation(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::DuplicateId(_) => ApiError::Conflict(e.to_string()),
            QueueError::NotFound(_) => ApiError::NotFound(e.to_string()),
            QueueError::InvalidTransition { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::DuplicateId(_) => ApiError::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            error!(error = %msg, "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
