//! In-memory implementation of DocumentStore
//!
//! Collections are `DashMap`s of documents; holding a document's entry
//! guard makes every single-document update (and every batch) atomic.
//! Array fields follow the hosted store's set semantics: add-to-set appends
//! unless an equal element exists, remove-from-set drops every equal element.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

use cricket_core::{
    DocumentId, DocumentStore, DomainError, FieldUpdate, Fields, OrderBy, RepoResult,
    SetMutation, SortDirection, StoreCapabilities, StoredDocument,
};

use crate::error::document_not_found;

/// Kind of write the store accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Batch,
    Delete,
}

#[derive(Debug, Default)]
struct FaultPlan {
    /// Writes to let through before failing
    remaining: Option<usize>,
    message: String,
    fail_reads: bool,
}

/// Process-local document store
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: DashMap<String, DashMap<DocumentId, Fields>>,
    atomic_batches: bool,
    faults: Mutex<FaultPlan>,
    writes: Mutex<Vec<WriteKind>>,
    write_count: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// Create an empty store without batch support
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advertise and honour atomic batches
    #[must_use]
    pub fn with_atomic_batches(mut self) -> Self {
        self.atomic_batches = true;
        self
    }

    /// Fail the next write with a store error
    pub fn fail_next_write(&self, message: impl Into<String>) {
        self.fail_write_after(0, message);
    }

    /// Let `successes` writes through, then fail the one after
    pub fn fail_write_after(&self, successes: usize, message: impl Into<String>) {
        let mut faults = self.faults.lock();
        faults.remaining = Some(successes);
        faults.message = message.into();
    }

    /// Make every read fail until switched off
    pub fn set_fail_reads(&self, fail: bool) {
        self.faults.lock().fail_reads = fail;
    }

    /// Drop any pending fault
    pub fn clear_faults(&self) {
        *self.faults.lock() = FaultPlan::default();
    }

    /// Number of writes accepted so far
    pub fn write_count(&self) -> usize {
        self.write_count.load(AtomicOrdering::SeqCst)
    }

    /// Accepted writes, oldest first
    pub fn write_log(&self) -> Vec<WriteKind> {
        self.writes.lock().clone()
    }

    /// Seed a document under a chosen id, bypassing fault injection and the write log
    pub fn insert_raw(&self, collection: &str, id: impl Into<DocumentId>, fields: Fields) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.into(), fields);
    }

    /// Raw fields of a document
    pub fn raw(&self, collection: &str, id: &DocumentId) -> Option<Fields> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id).map(|doc| doc.value().clone()))
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |docs| docs.len())
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check_write(&self) -> RepoResult<()> {
        let mut faults = self.faults.lock();
        match faults.remaining {
            Some(0) => {
                faults.remaining = None;
                debug!(reason = %faults.message, "Injected write failure");
                Err(DomainError::StoreError(std::mem::take(&mut faults.message)))
            }
            Some(n) => {
                faults.remaining = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_read(&self) -> RepoResult<()> {
        if self.faults.lock().fail_reads {
            return Err(DomainError::StoreError("injected read failure".to_string()));
        }
        Ok(())
    }

    fn record(&self, kind: WriteKind) {
        self.writes.lock().push(kind);
        self.write_count.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn with_document<F>(&self, collection: &str, id: &DocumentId, f: F) -> RepoResult<()>
    where
        F: FnOnce(&mut Fields) -> RepoResult<()>,
    {
        let docs = self
            .collections
            .get(collection)
            .ok_or_else(|| document_not_found(collection, id))?;
        let mut doc = docs
            .get_mut(id)
            .ok_or_else(|| document_not_found(collection, id))?;
        f(doc.value_mut())
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("collections", &self.collections.len())
            .field("atomic_batches", &self.atomic_batches)
            .field("write_count", &self.write_count())
            .finish_non_exhaustive()
    }
}

/// Apply one field update to a document's fields in place
fn apply_update(fields: &mut Fields, update: &FieldUpdate) -> RepoResult<()> {
    for (key, value) in &update.set {
        fields.insert(key.clone(), value.clone());
    }
    if let Some(mutation) = &update.remove_from_set {
        remove_from_set(fields, mutation)?;
    }
    if let Some(mutation) = &update.add_to_set {
        add_to_set(fields, mutation)?;
    }
    Ok(())
}

fn array_field<'a>(fields: &'a mut Fields, field: &str) -> RepoResult<Option<&'a mut Vec<Value>>> {
    match fields.get_mut(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(DomainError::StoreError(format!(
            "field {field} is not an array"
        ))),
    }
}

fn add_to_set(fields: &mut Fields, mutation: &SetMutation) -> RepoResult<()> {
    match array_field(fields, &mutation.field)? {
        Some(items) => {
            if !items.contains(&mutation.value) {
                items.push(mutation.value.clone());
            }
        }
        None => {
            fields.insert(
                mutation.field.clone(),
                Value::Array(vec![mutation.value.clone()]),
            );
        }
    }
    Ok(())
}

fn remove_from_set(fields: &mut Fields, mutation: &SetMutation) -> RepoResult<()> {
    if let Some(items) = array_field(fields, &mutation.field)? {
        items.retain(|item| item != &mutation.value);
    }
    Ok(())
}

/// Order two field values: numbers numerically, strings lexically,
/// mixed types by a fixed type rank
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[instrument(skip(self))]
    async fn get_all(&self, collection: &str, order: &OrderBy) -> RepoResult<Vec<StoredDocument>> {
        self.check_read()?;

        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut listed: Vec<StoredDocument> = docs
            .iter()
            .filter(|doc| {
                doc.value()
                    .get(&order.field)
                    .is_some_and(|value| !value.is_null())
            })
            .map(|doc| StoredDocument {
                id: doc.key().clone(),
                fields: doc.value().clone(),
            })
            .collect();
        drop(docs);

        listed.sort_by(|a, b| {
            let by_field = compare_values(
                a.fields.get(&order.field).unwrap_or(&Value::Null),
                b.fields.get(&order.field).unwrap_or(&Value::Null),
            );
            let by_field = match order.direction {
                SortDirection::Ascending => by_field,
                SortDirection::Descending => by_field.reverse(),
            };
            by_field.then_with(|| a.id.cmp(&b.id))
        });

        trace!(count = listed.len(), "Listed documents");
        Ok(listed)
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &DocumentId) -> RepoResult<Option<StoredDocument>> {
        self.check_read()?;

        Ok(self.raw(collection, id).map(|fields| StoredDocument {
            id: id.clone(),
            fields,
        }))
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &str, fields: Fields) -> RepoResult<DocumentId> {
        self.check_write()?;

        let id = DocumentId::new(uuid::Uuid::new_v4().simple().to_string());
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        self.record(WriteKind::Create);

        debug!(document_id = %id, "Document created");
        Ok(id)
    }

    #[instrument(skip(self, update))]
    async fn update_fields(
        &self,
        collection: &str,
        id: &DocumentId,
        update: FieldUpdate,
    ) -> RepoResult<()> {
        self.check_write()?;

        self.with_document(collection, id, |fields| apply_update(fields, &update))?;
        self.record(WriteKind::Update);

        trace!(document_id = %id, "Document updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &DocumentId) -> RepoResult<()> {
        self.check_write()?;

        let removed = self
            .collections
            .get(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_none() {
            return Err(document_not_found(collection, id));
        }
        self.record(WriteKind::Delete);

        debug!(document_id = %id, "Document deleted");
        Ok(())
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            atomic_batches: self.atomic_batches,
        }
    }

    #[instrument(skip(self, updates), fields(updates = updates.len()))]
    async fn apply_batch(
        &self,
        collection: &str,
        id: &DocumentId,
        updates: Vec<FieldUpdate>,
    ) -> RepoResult<()> {
        if !self.atomic_batches {
            return Err(DomainError::Unsupported("atomic batches"));
        }
        self.check_write()?;

        self.with_document(collection, id, |fields| {
            let mut staged = fields.clone();
            for update in &updates {
                apply_update(&mut staged, update)?;
            }
            *fields = staged;
            Ok(())
        })?;
        self.record(WriteKind::Batch);

        trace!(document_id = %id, "Batch committed");
        Ok(())
    }
}
