use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    render::RenderError,
    services::audio::AudioError,
    state::{sequencer::SequenceError, validation::public_message},
};

/// Message shown to users for every failure whose detail stays in the logs.
pub const INTERNAL_MESSAGE: &str =
    "Internal Server Error, please try again, if error persist, contact the developer";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// User input failed validation; messages are safe to display.
    #[error("validation failed: {}", public_message(.0))]
    Validation(ValidationErrors),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// No authenticated user on the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The timer belongs to another user.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Cue audio could not be produced.
    #[error("cue audio unavailable")]
    Audio(#[source] AudioError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::Validation(err)
    }
}

impl From<AudioError> for ServiceError {
    fn from(err: AudioError) -> Self {
        ServiceError::Audio(err)
    }
}

impl From<SequenceError> for ServiceError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::EmptyTimer { .. } => ServiceError::InvalidState(err.to_string()),
            SequenceError::LevelNotFound { .. } => ServiceError::NotFound("level not found".into()),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated, but not the owner.
    #[error("{0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Storage is down or degraded.
    #[error("Internal Server Error, please try again, if error persist, contact the developer")]
    ServiceUnavailable,
    /// Internal server error.
    #[error("Internal Server Error, please try again, if error persist, contact the developer")]
    Internal,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => {
                let message = public_message(&errors);
                debug!(%message, "rejected invalid input");
                AppError::BadRequest(message)
            }
            ServiceError::InvalidInput(message) => {
                debug!(%message, "rejected invalid input");
                AppError::BadRequest(message)
            }
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::Unavailable(source) => {
                error!(error = %source, detail = ?source, "storage failure");
                AppError::ServiceUnavailable
            }
            ServiceError::Degraded => {
                error!("request rejected while storage is degraded");
                AppError::ServiceUnavailable
            }
            err @ (ServiceError::InvalidState(_) | ServiceError::Audio(_)) => {
                error!(error = %err, detail = ?err, "internal failure");
                AppError::Internal
            }
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        error!(error = %err, detail = ?err, "failed to render template");
        AppError::Internal
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    /// HTTP status the error is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
