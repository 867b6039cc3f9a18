//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::DocumentId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: DocumentId },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Poll needs at least two options")]
    TooFewOptions,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not the owner of this decision")]
    NotDecisionOwner,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Already signed in")]
    AlreadyAuthenticated,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Malformed document {id}: {reason}")]
    MalformedDocument { id: DocumentId, reason: String },

    #[error("Unsupported by store: {0}")]
    Unsupported(&'static str),

    #[error("Auth provider error: {0}")]
    AuthProviderError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for presentation bindings
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::DocumentNotFound { .. } => "UNKNOWN_DOCUMENT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::UnknownOption(_) => "UNKNOWN_OPTION",
            Self::TooFewOptions => "TOO_FEW_OPTIONS",

            // Authorization
            Self::NotDecisionOwner => "NOT_DECISION_OWNER",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::AlreadyAuthenticated => "ALREADY_AUTHENTICATED",

            // Infrastructure
            Self::StoreError(_) => "STORE_ERROR",
            Self::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::AuthProviderError(_) => "AUTH_PROVIDER_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::UnknownOption(_) | Self::TooFewOptions
        )
    }

    /// Check if this is an authentication error
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::SessionExpired
                | Self::NotAuthenticated
                | Self::AlreadyAuthenticated
                | Self::AuthProviderError(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotDecisionOwner)
    }

    /// Check if this error came from the store adapter
    pub fn is_store(&self) -> bool {
        matches!(
            self,
            Self::StoreError(_) | Self::MalformedDocument { .. } | Self::Unsupported(_)
        )
    }
}
