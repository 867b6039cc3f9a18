//! Decision to view mappers

use cricket_core::{project, project_for, Choice, Decision, DecisionSubject, IdentityId};

use super::responses::{ChoiceResponse, EventView, PollView};
use crate::services::{ServiceError, ServiceResult};

impl From<&Choice> for ChoiceResponse {
    fn from(choice: &Choice) -> Self {
        Self {
            email: choice.identity_email.clone(),
            option: choice.option.clone(),
            recorded_at: choice.recorded_at,
        }
    }
}

impl EventView {
    /// Build the view of an event for `viewer` (anonymous if `None`)
    ///
    /// # Errors
    /// Returns an internal error if `decision` is not an event
    pub fn build(decision: &Decision, viewer: Option<&IdentityId>) -> ServiceResult<Self> {
        let DecisionSubject::Event(details) = &decision.subject else {
            return Err(ServiceError::internal(format!("{} is not an event", decision.id)));
        };

        let tally = match viewer {
            Some(viewer) => project_for(decision, viewer),
            None => project(decision),
        };

        Ok(Self {
            id: decision.id.to_string(),
            name: details.name.clone(),
            date: details.date,
            location: details.location.clone(),
            description: details.description.clone(),
            organizer_email: decision.owner.email.clone(),
            my_rsvp: tally.my_choice.clone(),
            tally,
            rsvps: decision.choices.iter().map(ChoiceResponse::from).collect(),
            can_delete: viewer.is_some_and(|viewer| decision.is_owned_by(viewer)),
            created_at: decision.created_at,
        })
    }
}

impl PollView {
    /// Build the view of a poll for `viewer` (anonymous if `None`)
    ///
    /// # Errors
    /// Returns an internal error if `decision` is not a poll
    pub fn build(decision: &Decision, viewer: Option<&IdentityId>) -> ServiceResult<Self> {
        let DecisionSubject::Poll(details) = &decision.subject else {
            return Err(ServiceError::internal(format!("{} is not a poll", decision.id)));
        };

        let tally = match viewer {
            Some(viewer) => project_for(decision, viewer),
            None => project(decision),
        };

        Ok(Self {
            id: decision.id.to_string(),
            question: details.question.clone(),
            created_by: decision.owner.email.clone(),
            my_vote: tally.my_choice.clone(),
            tally,
            can_delete: viewer.is_some_and(|viewer| decision.is_owned_by(viewer)),
            created_at: decision.created_at,
        })
    }
}
