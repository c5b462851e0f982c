use thiserror::Error;

/// Failure modes of a single user operation. Nothing here is fatal to the
/// process; every error is scoped to the call that produced it.
#[derive(Debug, Error)]
pub enum AppError {
    /// A user-scoped operation was invoked without a signed-in user.
    #[error("authentication required")]
    NotAuthenticated,

    /// Input rejected before any write was attempted.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The store failed; surfaced to the caller, never retried here.
    #[error("store error: {0}")]
    Store(String),

    /// The chat endpoint failed; carries the server-provided message.
    #[error("coach error: {0}")]
    Coach(String),
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Store(e.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Store(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
