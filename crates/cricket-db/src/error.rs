//! Error handling utilities for the document layer

use cricket_core::{DocumentId, DomainError};

/// Convert a serde_json failure while decoding a document
pub fn map_decode_error(id: &DocumentId, e: serde_json::Error) -> DomainError {
    malformed(id, e.to_string())
}

/// Convert a serde_json failure while encoding a document
pub fn map_encode_error(e: serde_json::Error) -> DomainError {
    DomainError::InternalError(format!("failed to encode document: {e}"))
}

/// Create a "malformed document" error
pub fn malformed(id: &DocumentId, reason: impl Into<String>) -> DomainError {
    DomainError::MalformedDocument {
        id: id.clone(),
        reason: reason.into(),
    }
}

/// Create a "document not found" error
pub fn document_not_found(collection: &str, id: &DocumentId) -> DomainError {
    DomainError::DocumentNotFound {
        collection: collection.to_string(),
        id: id.clone(),
    }
}
