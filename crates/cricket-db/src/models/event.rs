//! Event document model

use serde::{Deserialize, Serialize};

/// Document stored in the events collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub name: String,
    /// Start instant, epoch milliseconds
    pub date: i64,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organizer_id: String,
    pub organizer_email: String,
    #[serde(default)]
    pub rsvps: Vec<RsvpRecord>,
    pub created_at: i64,
}

/// One entry of an event's `rsvps` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub user_id: String,
    pub user_email: String,
    #[serde(rename = "type")]
    pub status: String,
    pub timestamp: i64,
}
