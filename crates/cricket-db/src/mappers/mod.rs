//! Decision <-> document mappers
//!
//! - `decision_to_fields`: the full document written by a single `create`
//! - `decision_from_document`: rebuild a `Decision` from stored fields
//! - `choice_to_value` / `options_to_value`: array elements and the cached
//!   option counts used by field-level updates

mod event;
mod poll;

use chrono::{DateTime, Utc};
use cricket_core::{Choice, Decision, DecisionKind, DecisionOption, DocumentId, Fields, RepoResult, StoredDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{malformed, map_decode_error, map_encode_error};
use crate::models::{OptionRecord, RsvpRecord, VoteRecord};

/// Encode a decision as the fields of a new document
///
/// The id is not part of the fields; the store assigns it.
pub fn decision_to_fields(decision: &Decision) -> RepoResult<Fields> {
    match decision.kind() {
        DecisionKind::Event => to_fields(&event::to_document(decision)?),
        DecisionKind::Poll => to_fields(&poll::to_document(decision)?),
    }
}

/// Rebuild a decision from a stored document
pub fn decision_from_document(kind: DecisionKind, doc: StoredDocument) -> RepoResult<Decision> {
    match kind {
        DecisionKind::Event => {
            let model = from_fields(&doc.id, doc.fields)?;
            event::from_document(doc.id, model)
        }
        DecisionKind::Poll => {
            let model = from_fields(&doc.id, doc.fields)?;
            poll::from_document(doc.id, model)
        }
    }
}

/// Encode a choice as an element of the decision's choices array
pub fn choice_to_value(kind: DecisionKind, choice: &Choice) -> RepoResult<Value> {
    match kind {
        DecisionKind::Event => serde_json::to_value(RsvpRecord::from(choice)),
        DecisionKind::Poll => serde_json::to_value(VoteRecord::from(choice)),
    }
    .map_err(map_encode_error)
}

/// Encode cached option counts as the poll `options` array
pub fn options_to_value(options: &[DecisionOption]) -> RepoResult<Value> {
    let records: Vec<OptionRecord> = options.iter().map(OptionRecord::from).collect();
    serde_json::to_value(records).map_err(map_encode_error)
}

fn to_fields<T: Serialize>(model: &T) -> RepoResult<Fields> {
    match serde_json::to_value(model).map_err(map_encode_error)? {
        Value::Object(fields) => Ok(fields),
        other => Err(map_encode_error(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

fn from_fields<T: DeserializeOwned>(id: &DocumentId, fields: Fields) -> RepoResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| map_decode_error(id, e))
}

fn millis_to_datetime(id: &DocumentId, field: &str, millis: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| malformed(id, format!("{field} is out of range: {millis}")))
}
