//! Event service
//!
//! Handles event creation, listing, RSVPs and deletion for the signed-in
//! identity.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{info, instrument, warn};
use validator::Validate;

use cricket_core::{Decision, DecisionKind, DocumentId, EventDetails, Identity};

use super::choice::{ChoiceEngine, ChoiceOutcome};
use super::context::ServiceContext;
use super::decision::DecisionRepository;
use super::error::{ServiceError, ServiceResult};
use crate::dto::{CreateEventRequest, EventView, RsvpAction};

/// Event service
pub struct EventService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventService<'a> {
    /// Create a new EventService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn repository(&self) -> DecisionRepository<'a> {
        DecisionRepository::new(self.ctx)
    }

    /// All events, latest date first, as seen by the current identity
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<EventView>> {
        let viewer = self.ctx.session().current_identity();
        let events = self.repository().refresh(DecisionKind::Event).await?;

        events
            .iter()
            .map(|event| EventView::build(event, viewer.as_ref().map(|identity| &identity.id)))
            .collect()
    }

    /// Load one event
    pub async fn get(&self, id: &DocumentId) -> ServiceResult<Decision> {
        self.repository().get(DecisionKind::Event, id).await
    }

    /// View of one event for the current identity
    pub async fn view(&self, id: &DocumentId) -> ServiceResult<EventView> {
        let event = self.get(id).await?;
        let viewer = self.ctx.session().current_identity();
        EventView::build(&event, viewer.as_ref().map(|identity| &identity.id))
    }

    /// Create an event owned by the current identity
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateEventRequest) -> ServiceResult<DocumentId> {
        let organizer = self.ctx.session().require_identity()?;
        request.validate()?;

        let details = EventDetails {
            name: required(&request.name, "Event name")?,
            date: parse_event_date(&request.date, &request.time)?,
            location: required(&request.location, "Location")?,
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_string),
        };

        let id = self
            .repository()
            .create(&Decision::new_event(organizer, details))
            .await?;

        info!(event_id = %id, "Event created");
        Ok(id)
    }

    /// Set or cancel the current identity's RSVP
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn rsvp(&self, event: &Decision, action: RsvpAction) -> ServiceResult<ChoiceOutcome> {
        let identity = self.ctx.session().require_identity()?;
        ensure_event(event)?;

        ChoiceEngine::new(self.ctx)
            .apply_choice(event, &identity, action.into())
            .await
    }

    /// Delete an event; only its organizer may
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn delete(&self, event: &Decision) -> ServiceResult<()> {
        let identity = self.ctx.session().require_identity()?;
        ensure_event(event)?;
        ensure_owner(event, &identity, "delete this event")?;

        self.repository().delete(DecisionKind::Event, &event.id).await
    }
}

fn ensure_event(decision: &Decision) -> ServiceResult<()> {
    match decision.kind() {
        DecisionKind::Event => Ok(()),
        other => Err(ServiceError::validation(format!("Expected an event, got a {other}"))),
    }
}

/// Owner check, before any store call
pub(crate) fn ensure_owner(decision: &Decision, identity: &Identity, action: &str) -> ServiceResult<()> {
    if decision.is_owned_by(&identity.id) {
        return Ok(());
    }
    warn!(
        decision_id = %decision.id,
        identity_id = %identity.id,
        "Rejected action by non-owner"
    );
    Err(ServiceError::permission_denied(action))
}

/// Trimmed value, or a validation error naming `field`
pub(crate) fn required(value: &str, field: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// `YYYY-MM-DD` plus `HH:MM`, read as UTC
fn parse_event_date(date: &str, time: &str) -> ServiceResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::validation(format!("Invalid date: {date}")))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| ServiceError::validation(format!("Invalid time: {time}")))?;

    Ok(date.and_time(time).and_utc())
}
