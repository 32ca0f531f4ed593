use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Event tag outside the supported set; the boundary answers "not implemented".
    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    /// Supported tag whose payload lacks required fields or has the wrong shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("External service error: {0}")]
    ExternalService(#[from] deskbridge_store::error::StoreError),

    /// Data the flow depends on is missing, e.g. a contact with no linked ticket.
    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error(transparent)]
    CoreError(#[from] deskbridge_core::error::CoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
