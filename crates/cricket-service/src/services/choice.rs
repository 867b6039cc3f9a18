//! Choice consistency engine
//!
//! Keeps each identity at no more than one entry in a decision's choices,
//! and for polls keeps the cached option counts in step with those entries.
//!
//! A change is planned against the stored decision first ([`ChoicePlan`],
//! pure), then executed as store mutations:
//!
//! - same option again: nothing is written
//! - a different option, or cancel: the previous entry is removed
//! - a new option: the new entry is added
//!
//! Removal and addition are separate writes unless the store commits
//! batches atomically and batching is enabled. The order is always
//! remove-then-add, so an interruption leaves zero entries for the
//! identity, never two.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use cricket_core::{Choice, Decision, DomainError, FieldUpdate, Identity, RepoResult};
use cricket_db::{choice_to_value, options_to_value};

use super::context::ServiceContext;
use super::decision::DecisionRepository;
use super::error::{ChoiceStage, ServiceError, ServiceResult};

/// What the identity wants to hold afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceIntent {
    /// Hold exactly this option
    Select(String),
    /// Hold nothing
    Cancel,
}

impl ChoiceIntent {
    pub fn select(option: impl Into<String>) -> Self {
        Self::Select(option.into())
    }
}

/// Planned effect of a choice change on one decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePlan {
    /// Entry to remove
    pub previous: Option<Choice>,
    /// Entry to add
    pub next: Option<Choice>,
}

impl ChoicePlan {
    /// Plan the change from `decision`'s current choices
    ///
    /// # Errors
    /// `UnknownOption` if the intent names an option the decision lacks
    pub fn new(decision: &Decision, identity: &Identity, intent: &ChoiceIntent) -> ServiceResult<Self> {
        let existing = decision.choice_of(&identity.id);

        match intent {
            ChoiceIntent::Select(option) => {
                if !decision.has_option(option) {
                    return Err(DomainError::UnknownOption(option.clone()).into());
                }
                if existing.is_some_and(|choice| choice.is_option(option)) {
                    return Ok(Self::noop());
                }
                Ok(Self {
                    previous: existing.cloned(),
                    next: Some(Choice::new(identity, option.as_str())),
                })
            }
            ChoiceIntent::Cancel => Ok(Self {
                previous: existing.cloned(),
                next: None,
            }),
        }
    }

    fn noop() -> Self {
        Self {
            previous: None,
            next: None,
        }
    }

    /// Nothing needs writing
    pub fn is_noop(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }

    /// Apply the plan to a local copy of the decision
    pub fn apply_to(&self, decision: &mut Decision) {
        if let Some(previous) = &self.previous {
            decision.remove_choice(previous);
        }
        if let Some(next) = &self.next {
            decision.add_choice(next.clone());
        }
    }
}

/// Result of applying a choice
#[derive(Debug, Clone)]
pub struct ChoiceOutcome {
    /// Local reconstruction of the decision after the change
    pub decision: Decision,
    /// Store writes issued
    pub mutations: usize,
}

impl ChoiceOutcome {
    /// Option now held by `identity` in the reconstructed decision
    pub fn choice_of(&self, identity: &Identity) -> Option<&str> {
        self.decision
            .choice_of(&identity.id)
            .map(|choice| choice.option.as_str())
    }
}

/// Choice engine
pub struct ChoiceEngine<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChoiceEngine<'a> {
    /// Create a new ChoiceEngine
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Preview the effect of an intent without touching the store
    pub fn plan(
        &self,
        decision: &Decision,
        identity: &Identity,
        intent: &ChoiceIntent,
    ) -> ServiceResult<ChoicePlan> {
        ChoicePlan::new(decision, identity, intent)
    }

    /// Make `identity` hold the option named by `intent` on `decision`
    ///
    /// The plan is made against the stored document, not the caller's copy,
    /// so a stale `decision` cannot leave a second entry behind. Returns the
    /// stored decision with the change applied locally.
    #[instrument(skip(self, decision, identity), fields(decision_id = %decision.id, identity_id = %identity.id))]
    pub async fn apply_choice(
        &self,
        decision: &Decision,
        identity: &Identity,
        intent: ChoiceIntent,
    ) -> ServiceResult<ChoiceOutcome> {
        let current = DecisionRepository::new(self.ctx).reload(decision).await?;

        let plan = ChoicePlan::new(&current, identity, &intent)?;
        if plan.is_noop() {
            debug!("Choice already in place");
            return Ok(ChoiceOutcome {
                decision: current,
                mutations: 0,
            });
        }

        let mut snapshot = current.clone();
        let removal = match &plan.previous {
            Some(previous) => {
                snapshot.remove_choice(previous);
                Some(removal_update(&snapshot, previous).map_err(ServiceError::from)?)
            }
            None => None,
        };
        let addition = match &plan.next {
            Some(next) => {
                snapshot.add_choice(next.clone());
                Some(addition_update(&snapshot, next).map_err(ServiceError::from)?)
            }
            None => None,
        };

        let mutations = match (removal, addition) {
            (Some(removal), Some(addition)) if self.ctx.use_atomic_batches() => {
                self.commit_batch(&current, vec![removal, addition]).await?
            }
            (removal, addition) => self.commit_sequential(&current, identity, removal, addition).await?,
        };

        info!(
            option = plan.next.as_ref().map_or("none", |choice| choice.option.as_str()),
            mutations,
            "Choice applied"
        );

        Ok(ChoiceOutcome {
            decision: snapshot,
            mutations,
        })
    }

    async fn commit_batch(&self, decision: &Decision, updates: Vec<FieldUpdate>) -> ServiceResult<usize> {
        let collection = self.ctx.collection(decision.kind());

        self.ctx
            .store()
            .apply_batch(collection, &decision.id, updates)
            .await
            .map_err(|source| ServiceError::ChoiceUpdateFailed {
                decision_id: decision.id.clone(),
                stage: ChoiceStage::Batch,
                removed_previous: false,
                source,
            })?;
        Ok(1)
    }

    async fn commit_sequential(
        &self,
        decision: &Decision,
        identity: &Identity,
        removal: Option<FieldUpdate>,
        addition: Option<FieldUpdate>,
    ) -> ServiceResult<usize> {
        let collection = self.ctx.collection(decision.kind());
        let store = self.ctx.store();
        let mut mutations = 0;

        if let Some(update) = removal {
            store
                .update_fields(collection, &decision.id, update)
                .await
                .map_err(|source| ServiceError::ChoiceUpdateFailed {
                    decision_id: decision.id.clone(),
                    stage: ChoiceStage::Removal,
                    removed_previous: false,
                    source,
                })?;
            mutations += 1;
        }

        if let Some(update) = addition {
            let removed_previous = mutations > 0;
            store
                .update_fields(collection, &decision.id, update)
                .await
                .map_err(|source| {
                    if removed_previous {
                        warn!(
                            decision_id = %decision.id,
                            identity_id = %identity.id,
                            error = %source,
                            "Previous choice removed but new choice not recorded"
                        );
                    }
                    ServiceError::ChoiceUpdateFailed {
                        decision_id: decision.id.clone(),
                        stage: ChoiceStage::Addition,
                        removed_previous,
                        source,
                    }
                })?;
            mutations += 1;
        }

        Ok(mutations)
    }
}

/// Remove `previous`; `after` already reflects the removal
fn removal_update(after: &Decision, previous: &Choice) -> RepoResult<FieldUpdate> {
    let kind = after.kind();
    let update = FieldUpdate::new().remove_from_set(kind.choices_field(), choice_to_value(kind, previous)?);
    with_counts(update, after)
}

/// Add `next`; `after` already reflects the addition
fn addition_update(after: &Decision, next: &Choice) -> RepoResult<FieldUpdate> {
    let kind = after.kind();
    let update = FieldUpdate::new().add_to_set(kind.choices_field(), choice_to_value(kind, next)?);
    with_counts(update, after)
}

/// Poll counts travel in the same write as the entry they describe
fn with_counts(update: FieldUpdate, after: &Decision) -> RepoResult<FieldUpdate> {
    match after.kind().options_field() {
        Some(field) => {
            let options: Value = options_to_value(&after.options)?;
            Ok(update.set(field, options))
        }
        None => Ok(update),
    }
}
