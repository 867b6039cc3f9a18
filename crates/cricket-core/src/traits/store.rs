//! Document store port
//!
//! The store is an opaque collection-of-documents service. The domain defines
//! the primitives it relies on; adapters provide them. Single-document field
//! updates must be atomic. Add-to-set and remove-from-set compare elements by
//! deep equality, like the hosted store's array-union and array-remove.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::value_objects::DocumentId;

/// Result type for store and auth port operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Raw document fields
pub type Fields = Map<String, Value>;

/// A document as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub fields: Fields,
}

/// Sort direction for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Listing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    /// Order ascending by a field
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Order descending by a field
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// One element added to or removed from an array field
#[derive(Debug, Clone, PartialEq)]
pub struct SetMutation {
    pub field: String,
    pub value: Value,
}

/// Field-level update of a single document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldUpdate {
    /// Fields overwritten wholesale
    pub set: Fields,
    /// Element appended to an array field unless an equal element exists
    pub add_to_set: Option<SetMutation>,
    /// Element whose every equal occurrence is removed from an array field
    pub remove_from_set: Option<SetMutation>,
}

impl FieldUpdate {
    /// Empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a field
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set.insert(field.into(), value);
        self
    }

    /// Append an element to an array field
    pub fn add_to_set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.add_to_set = Some(SetMutation {
            field: field.into(),
            value,
        });
        self
    }

    /// Remove an element from an array field
    pub fn remove_from_set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.remove_from_set = Some(SetMutation {
            field: field.into(),
            value,
        });
        self
    }

    /// Check if the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add_to_set.is_none() && self.remove_from_set.is_none()
    }
}

/// Optional features a store adapter may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCapabilities {
    /// `apply_batch` commits several updates to one document atomically
    pub atomic_batches: bool,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection that has `order.field`, sorted
    async fn get_all(&self, collection: &str, order: &OrderBy) -> RepoResult<Vec<StoredDocument>>;

    /// Fetch one document
    async fn get(&self, collection: &str, id: &DocumentId) -> RepoResult<Option<StoredDocument>>;

    /// Create a document in one write and return its new id
    async fn create(&self, collection: &str, fields: Fields) -> RepoResult<DocumentId>;

    /// Apply a field-level update to one document
    async fn update_fields(
        &self,
        collection: &str,
        id: &DocumentId,
        update: FieldUpdate,
    ) -> RepoResult<()>;

    /// Delete a document (irreversible)
    async fn delete(&self, collection: &str, id: &DocumentId) -> RepoResult<()>;

    /// Features this adapter supports
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::default()
    }

    /// Apply several updates to one document as a single atomic commit
    async fn apply_batch(
        &self,
        _collection: &str,
        _id: &DocumentId,
        _updates: Vec<FieldUpdate>,
    ) -> RepoResult<()> {
        Err(DomainError::Unsupported("atomic batches"))
    }
}
