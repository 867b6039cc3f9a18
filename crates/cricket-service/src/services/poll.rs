//! Poll service

use tracing::{info, instrument};
use validator::Validate;

use cricket_core::{Decision, DecisionKind, DocumentId, DomainError};

use super::choice::{ChoiceEngine, ChoiceIntent, ChoiceOutcome};
use super::context::ServiceContext;
use super::decision::DecisionRepository;
use super::error::{ServiceError, ServiceResult};
use super::event::{ensure_owner, required};
use crate::dto::{CreatePollRequest, PollView};

/// Fewest options a poll may have
pub const MIN_POLL_OPTIONS: usize = 2;

/// Poll service
pub struct PollService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PollService<'a> {
    /// Create a new PollService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn repository(&self) -> DecisionRepository<'a> {
        DecisionRepository::new(self.ctx)
    }

    /// All polls, newest first, as seen by the current identity
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<PollView>> {
        let viewer = self.ctx.session().current_identity();
        let polls = self.repository().refresh(DecisionKind::Poll).await?;

        polls
            .iter()
            .map(|poll| PollView::build(poll, viewer.as_ref().map(|identity| &identity.id)))
            .collect()
    }

    /// Load one poll
    pub async fn get(&self, id: &DocumentId) -> ServiceResult<Decision> {
        self.repository().get(DecisionKind::Poll, id).await
    }

    /// View of one poll for the current identity
    pub async fn view(&self, id: &DocumentId) -> ServiceResult<PollView> {
        let poll = self.get(id).await?;
        let viewer = self.ctx.session().current_identity();
        PollView::build(&poll, viewer.as_ref().map(|identity| &identity.id))
    }

    /// Create a poll owned by the current identity
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreatePollRequest) -> ServiceResult<DocumentId> {
        let creator = self.ctx.session().require_identity()?;
        request.validate()?;

        let question = required(&request.question, "Question")?;
        let options = request.option_names();
        if options.len() < MIN_POLL_OPTIONS {
            return Err(DomainError::TooFewOptions.into());
        }

        let option_count = options.len();
        let id = self
            .repository()
            .create(&Decision::new_poll(creator, question, options))
            .await?;

        info!(poll_id = %id, option_count, "Poll created");
        Ok(id)
    }

    /// Vote for `option`, replacing any earlier vote
    #[instrument(skip(self, poll), fields(poll_id = %poll.id))]
    pub async fn vote(&self, poll: &Decision, option: &str) -> ServiceResult<ChoiceOutcome> {
        self.choose(poll, ChoiceIntent::select(option)).await
    }

    /// Withdraw the current identity's vote
    #[instrument(skip(self, poll), fields(poll_id = %poll.id))]
    pub async fn retract(&self, poll: &Decision) -> ServiceResult<ChoiceOutcome> {
        self.choose(poll, ChoiceIntent::Cancel).await
    }

    async fn choose(&self, poll: &Decision, intent: ChoiceIntent) -> ServiceResult<ChoiceOutcome> {
        let identity = self.ctx.session().require_identity()?;
        ensure_poll(poll)?;

        ChoiceEngine::new(self.ctx)
            .apply_choice(poll, &identity, intent)
            .await
    }

    /// Delete a poll; only its creator may
    #[instrument(skip(self, poll), fields(poll_id = %poll.id))]
    pub async fn delete(&self, poll: &Decision) -> ServiceResult<()> {
        let identity = self.ctx.session().require_identity()?;
        ensure_poll(poll)?;
        ensure_owner(poll, &identity, "delete this poll")?;

        self.repository().delete(DecisionKind::Poll, &poll.id).await
    }
}

fn ensure_poll(decision: &Decision) -> ServiceResult<()> {
    match decision.kind() {
        DecisionKind::Poll => Ok(()),
        other => Err(ServiceError::validation(format!("Expected a poll, got a {other}"))),
    }
}
