//! Application error types
//!
//! Errors raised by the shared utilities (config, password hashing, session
//! tokens) before they reach the service layer.

use cricket_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get error code for presentation bindings
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingAuth => "MISSING_AUTH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Check if this is an authentication failure
    #[must_use]
    pub fn is_auth(&self) -> bool {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired | Self::MissingAuth => {
                true
            }
            Self::Domain(e) => e.is_auth(),
            _ => false,
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl std::fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Convert into the domain error an auth provider reports
    #[must_use]
    pub fn into_domain(self) -> DomainError {
        match self {
            Self::InvalidCredentials => DomainError::InvalidCredentials,
            Self::TokenExpired => DomainError::SessionExpired,
            Self::InvalidToken | Self::MissingAuth => DomainError::NotAuthenticated,
            Self::Validation(msg) => DomainError::ValidationError(msg),
            Self::Domain(e) => e,
            other => DomainError::AuthProviderError(other.to_string()),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
