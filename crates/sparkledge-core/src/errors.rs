//! Application error taxonomy.
//!
//! Every account operation returns `Result<T, AppError>`. The variants are the
//! conditions a caller is expected to branch on; anything unexpected (database,
//! hashing, token encoding or mail transport failures) is folded into
//! [`AppError::InternalFailure`] with the underlying cause attached.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Registration hit the unique constraint on `email`.
    #[error("Email provided already exists.")]
    DuplicateIdentity,

    /// Sign-in failed. Deliberately does not say whether the email or the
    /// password was wrong.
    #[error("Invalid login credentials.")]
    InvalidCredentials,

    /// Refresh or access token rejected.
    #[error("Access denied.")]
    AccessDenied,

    /// Password-reset token rejected.
    #[error("Invalid token or email.")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0:#}")]
    InternalFailure(#[source] anyhow::Error),
}

impl AppError {
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::InternalFailure(err.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalFailure(anyhow::anyhow!(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateIdentity => "duplicate_identity",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::AccessDenied => "access_denied",
            AppError::InvalidToken => "invalid_token",
            AppError::NotFound(_) => "not_found",
            AppError::InternalFailure(_) => "internal_failure",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::InternalFailure(_))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::internal(err)
    }
}
