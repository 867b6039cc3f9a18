//! Event decision <-> document mapper

use cricket_core::{
    Choice, Decision, DecisionOption, DecisionSubject, DocumentId, EventDetails, Identity,
    RepoResult, RsvpStatus,
};

use super::millis_to_datetime;
use crate::error::malformed;
use crate::models::{EventDocument, RsvpRecord};

impl From<&Choice> for RsvpRecord {
    fn from(choice: &Choice) -> Self {
        Self {
            user_id: choice.identity_id.to_string(),
            user_email: choice.identity_email.clone(),
            status: choice.option.clone(),
            timestamp: choice.recorded_at.timestamp_millis(),
        }
    }
}

pub(super) fn to_document(decision: &Decision) -> RepoResult<EventDocument> {
    let DecisionSubject::Event(details) = &decision.subject else {
        return Err(malformed(&decision.id, "not an event"));
    };

    Ok(EventDocument {
        name: details.name.clone(),
        date: details.date.timestamp_millis(),
        location: details.location.clone(),
        description: details.description.clone(),
        organizer_id: decision.owner.id.to_string(),
        organizer_email: decision.owner.email.clone(),
        rsvps: decision.choices.iter().map(RsvpRecord::from).collect(),
        created_at: decision.created_at.timestamp_millis(),
    })
}

pub(super) fn from_document(id: DocumentId, model: EventDocument) -> RepoResult<Decision> {
    let choices = model
        .rsvps
        .into_iter()
        .map(|record| {
            let identity = Identity::new(record.user_id, record.user_email);
            let at = millis_to_datetime(&id, "rsvps.timestamp", record.timestamp)?;
            Ok(Choice::at(&identity, record.status, at))
        })
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(Decision {
        subject: DecisionSubject::Event(EventDetails {
            name: model.name,
            date: millis_to_datetime(&id, "date", model.date)?,
            location: model.location,
            description: model.description,
        }),
        options: RsvpStatus::ALL
            .iter()
            .map(|status| DecisionOption::new(status.as_str()))
            .collect(),
        choices,
        owner: Identity::new(model.organizer_id, model.organizer_email),
        created_at: millis_to_datetime(&id, "createdAt", model.created_at)?,
        id,
    })
}
