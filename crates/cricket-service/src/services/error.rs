//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use cricket_common::AppError;
use cricket_core::{DocumentId, DomainError};
use std::fmt;
use validator::ValidationErrors;

/// Step of a choice update that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceStage {
    /// Removing the previous entry
    Removal,
    /// Adding the new entry
    Addition,
    /// Committing removal and addition together
    Batch,
}

impl fmt::Display for ChoiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removal => f.write_str("removal"),
            Self::Addition => f.write_str("addition"),
            Self::Batch => f.write_str("batch"),
        }
    }
}

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation, or an auth provider failure
    Domain(DomainError),

    /// Application error (config, tokens, etc.)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Caller may not perform the action
    PermissionDenied { action: String },

    /// Validation error
    Validation(String),

    /// Reading from the document store failed
    StoreRead {
        operation: &'static str,
        source: DomainError,
    },

    /// Writing to the document store failed
    StoreWrite {
        operation: &'static str,
        source: DomainError,
    },

    /// A choice update did not complete
    ChoiceUpdateFailed {
        decision_id: DocumentId,
        stage: ChoiceStage,
        /// The previous entry is already gone from the store
        removed_previous: bool,
        source: DomainError,
    },

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::PermissionDenied { action } => write!(f, "Not allowed to {action}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::StoreRead { operation, source } => {
                write!(f, "Store read failed ({operation}): {source}")
            }
            Self::StoreWrite { operation, source } => {
                write!(f, "Store write failed ({operation}): {source}")
            }
            Self::ChoiceUpdateFailed {
                decision_id,
                stage,
                removed_previous,
                source,
            } => {
                write!(f, "Choice update on {decision_id} failed at {stage}: {source}")?;
                if *removed_previous {
                    write!(f, " (previous choice already removed)")?;
                }
                Ok(())
            }
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e)
            | Self::StoreRead { source: e, .. }
            | Self::StoreWrite { source: e, .. }
            | Self::ChoiceUpdateFailed { source: e, .. } => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wrap a failed store read; missing documents stay `NotFound`
    pub fn store_read(operation: &'static str, source: DomainError) -> Self {
        Self::classify_store(source, |source| Self::StoreRead { operation, source })
    }

    /// Wrap a failed store write; missing documents stay `NotFound`
    pub fn store_write(operation: &'static str, source: DomainError) -> Self {
        Self::classify_store(source, |source| Self::StoreWrite { operation, source })
    }

    fn classify_store(source: DomainError, wrap: impl FnOnce(DomainError) -> Self) -> Self {
        match source {
            DomainError::DocumentNotFound { collection, id } => Self::NotFound {
                resource: "Document",
                id: format!("{collection}/{id}"),
            },
            other if other.is_store() || matches!(other, DomainError::InternalError(_)) => {
                wrap(other)
            }
            other => Self::Domain(other),
        }
    }

    /// Get the error code for presentation bindings
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StoreRead { .. } => "STORE_READ_ERROR",
            Self::StoreWrite { .. } => "STORE_WRITE_ERROR",
            Self::ChoiceUpdateFailed { .. } => "CHOICE_UPDATE_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether repeating the call could succeed
    ///
    /// Nothing is retried automatically; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreRead { .. } | Self::StoreWrite { .. } | Self::ChoiceUpdateFailed { .. }
        )
    }

    /// Authentication failure (bad credentials, expired or missing session)
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_auth(),
            Self::App(e) => e.is_auth(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_validation(),
            Self::Validation(_) => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_not_found(),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => Self::Domain(e),
            other => Self::App(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
            other => AppError::Internal(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
