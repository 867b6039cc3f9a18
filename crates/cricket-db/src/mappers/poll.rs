//! Poll decision <-> document mapper

use cricket_core::{
    Choice, Decision, DecisionOption, DecisionSubject, DocumentId, Identity, PollDetails,
    RepoResult,
};

use super::millis_to_datetime;
use crate::error::malformed;
use crate::models::{OptionRecord, PollDocument, VoteRecord};

impl From<&Choice> for VoteRecord {
    fn from(choice: &Choice) -> Self {
        Self {
            user_id: choice.identity_id.to_string(),
            user_email: choice.identity_email.clone(),
            option_name: choice.option.clone(),
            timestamp: choice.recorded_at.timestamp_millis(),
        }
    }
}

impl From<&DecisionOption> for OptionRecord {
    fn from(option: &DecisionOption) -> Self {
        Self {
            name: option.name.clone(),
            votes: option.count,
        }
    }
}

impl From<OptionRecord> for DecisionOption {
    fn from(record: OptionRecord) -> Self {
        Self {
            name: record.name,
            count: record.votes,
        }
    }
}

pub(super) fn to_document(decision: &Decision) -> RepoResult<PollDocument> {
    let DecisionSubject::Poll(details) = &decision.subject else {
        return Err(malformed(&decision.id, "not a poll"));
    };

    Ok(PollDocument {
        question: details.question.clone(),
        options: decision.options.iter().map(OptionRecord::from).collect(),
        user_votes: decision.choices.iter().map(VoteRecord::from).collect(),
        created_by: decision.owner.email.clone(),
        creator_id: decision.owner.id.to_string(),
        created_at: decision.created_at.timestamp_millis(),
    })
}

pub(super) fn from_document(id: DocumentId, model: PollDocument) -> RepoResult<Decision> {
    let choices = model
        .user_votes
        .into_iter()
        .map(|record| {
            let identity = Identity::new(record.user_id, record.user_email);
            let at = millis_to_datetime(&id, "userVotes.timestamp", record.timestamp)?;
            Ok(Choice::at(&identity, record.option_name, at))
        })
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(Decision {
        subject: DecisionSubject::Poll(PollDetails {
            question: model.question,
        }),
        options: model.options.into_iter().map(DecisionOption::from).collect(),
        choices,
        owner: Identity::new(model.creator_id, model.created_by),
        created_at: millis_to_datetime(&id, "createdAt", model.created_at)?,
        id,
    })
}
