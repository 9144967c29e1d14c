//! Shared primitives for all Rust crates in the panaderia workspace.

#![forbid(unsafe_code)]

/// Authenticated actor context shared across services.
pub mod auth;

use thiserror::Error;

pub use auth::AuthenticatedUser;

/// Result type used across panaderia crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error. The outer message is safe to surface;
    /// the underlying cause must be logged, never returned to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the caller-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn display_includes_category_prefix() {
        let error = AppError::NotFound("Cliente no encontrado".to_owned());
        assert_eq!(error.to_string(), "not found: Cliente no encontrado");
    }

    #[test]
    fn message_strips_category_prefix() {
        let error = AppError::Conflict("El cliente con este CI ya existe.".to_owned());
        assert_eq!(error.message(), "El cliente con este CI ya existe.");
    }
}
