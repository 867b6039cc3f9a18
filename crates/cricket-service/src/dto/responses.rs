//! Response DTOs
//!
//! Views implement `Serialize` for whatever presentation layer renders them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cricket_core::Tally;

/// One recorded choice, as shown next to a decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceResponse {
    pub email: String,
    pub option: String,
    pub recorded_at: DateTime<Utc>,
}

/// Event as shown to a viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organizer_email: String,
    pub tally: Tally,
    pub rsvps: Vec<ChoiceResponse>,
    /// Viewer's RSVP status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_rsvp: Option<String>,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
}

/// Poll as shown to a viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollView {
    pub id: String,
    pub question: String,
    pub created_by: String,
    pub tally: Tally,
    /// Option the viewer voted for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<String>,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
}

impl PollView {
    pub fn has_voted(&self) -> bool {
        self.my_vote.is_some()
    }
}
