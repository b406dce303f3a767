use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum CivicError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CivicError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Event(EventError::InvalidInput {
            message: message.into(),
        })
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
