use thiserror::Error;

/// Failure of a single menu action. None of these end the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("please login first")]
    NotLoggedIn,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// Errors caused by what the operator typed rather than by the system.
    pub fn is_operator_error(&self) -> bool {
        !matches!(self, AppError::Storage(_) | AppError::Credential(_))
    }
}
