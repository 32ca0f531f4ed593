use salvo::http::StatusCode;
use thiserror::Error;

use deskbridge_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    CoreError(#[from] deskbridge_core::error::CoreError),
}

impl AppError {
    /// ## Summary
    /// HTTP status reported to the webhook sender for this error.
    ///
    /// Unsupported event tags answer `501 Not Implemented` and malformed
    /// payloads `400 Bad Request`; everything else is a server error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(ServiceError::UnsupportedEvent(_)) => StatusCode::NOT_IMPLEMENTED,
            Self::ServiceError(ServiceError::MalformedPayload(_)) => StatusCode::BAD_REQUEST,
            Self::ServiceError(_) | Self::CoreError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
