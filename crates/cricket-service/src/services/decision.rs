//! Decision repository
//!
//! Listing, lookup, creation and deletion of decisions over the document
//! store, with document mapping. Ownership checks live in the event and
//! poll services.

use tracing::{debug, info, instrument, warn};

use cricket_core::{Decision, DecisionKind, DocumentId, FieldUpdate, OrderBy};
use cricket_db::{decision_from_document, decision_to_fields, options_to_value};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Decision repository
pub struct DecisionRepository<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DecisionRepository<'a> {
    /// Create a new DecisionRepository
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List decisions of `kind`, newest first by the kind's sort field
    /// unless `order` says otherwise
    ///
    /// Documents that fail to map are skipped with a warning.
    #[instrument(skip(self))]
    pub async fn list(&self, kind: DecisionKind, order: Option<OrderBy>) -> ServiceResult<Vec<Decision>> {
        let order = order.unwrap_or_else(|| OrderBy::desc(kind.default_sort_field()));
        let docs = self
            .ctx
            .store()
            .get_all(self.ctx.collection(kind), &order)
            .await
            .map_err(|e| ServiceError::store_read("list", e))?;

        let decisions: Vec<Decision> = docs
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                match decision_from_document(kind, doc) {
                    Ok(decision) => Some(decision),
                    Err(e) => {
                        warn!(document_id = %id, error = %e, "Skipping unreadable document");
                        None
                    }
                }
            })
            .collect();

        debug!(count = decisions.len(), "Listed decisions");
        Ok(decisions)
    }

    /// Re-list with the default order
    pub async fn refresh(&self, kind: DecisionKind) -> ServiceResult<Vec<Decision>> {
        self.list(kind, None).await
    }

    /// Fetch one decision
    #[instrument(skip(self))]
    pub async fn get(&self, kind: DecisionKind, id: &DocumentId) -> ServiceResult<Decision> {
        let doc = self
            .ctx
            .store()
            .get(self.ctx.collection(kind), id)
            .await
            .map_err(|e| ServiceError::store_read("get", e))?
            .ok_or_else(|| ServiceError::not_found(resource_name(kind), id.as_str()))?;

        Ok(decision_from_document(kind, doc)?)
    }

    /// Fetch the store's current view of `decision`
    pub async fn reload(&self, decision: &Decision) -> ServiceResult<Decision> {
        self.get(decision.kind(), &decision.id).await
    }

    /// Write a fully formed decision in one store call and return its id
    #[instrument(skip(self, decision), fields(kind = %decision.kind()))]
    pub async fn create(&self, decision: &Decision) -> ServiceResult<DocumentId> {
        let kind = decision.kind();
        let fields = decision_to_fields(decision)?;

        let id = self
            .ctx
            .store()
            .create(self.ctx.collection(kind), fields)
            .await
            .map_err(|e| ServiceError::store_write("create", e))?;

        info!(decision_id = %id, owner = %decision.owner.id, "Decision created");
        Ok(id)
    }

    /// Delete a decision (irreversible)
    #[instrument(skip(self))]
    pub async fn delete(&self, kind: DecisionKind, id: &DocumentId) -> ServiceResult<()> {
        self.ctx
            .store()
            .delete(self.ctx.collection(kind), id)
            .await
            .map_err(|e| ServiceError::store_write("delete", e))?;

        info!(decision_id = %id, "Decision deleted");
        Ok(())
    }

    /// Re-derive a poll's cached option counts from its recorded votes
    ///
    /// Writes only when the cached counts disagree.
    #[instrument(skip(self))]
    pub async fn repair_counts(&self, id: &DocumentId) -> ServiceResult<Decision> {
        let kind = DecisionKind::Poll;
        let mut decision = self.get(kind, id).await?;
        if decision.counts_consistent() {
            return Ok(decision);
        }

        decision.recount();
        let Some(field) = kind.options_field() else {
            return Ok(decision);
        };
        let update = FieldUpdate::new().set(field, options_to_value(&decision.options)?);

        self.ctx
            .store()
            .update_fields(self.ctx.collection(kind), id, update)
            .await
            .map_err(|e| ServiceError::store_write("repair counts", e))?;

        warn!(decision_id = %id, "Cached poll counts repaired");
        Ok(decision)
    }
}

fn resource_name(kind: DecisionKind) -> &'static str {
    match kind {
        DecisionKind::Event => "Event",
        DecisionKind::Poll => "Poll",
    }
}
