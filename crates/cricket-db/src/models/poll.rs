//! Poll document model

use serde::{Deserialize, Serialize};

/// Document stored in the polls collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDocument {
    pub question: String,
    pub options: Vec<OptionRecord>,
    #[serde(default)]
    pub user_votes: Vec<VoteRecord>,
    /// Creator email
    pub created_by: String,
    pub creator_id: String,
    pub created_at: i64,
}

/// Option with its cached vote count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    pub name: String,
    #[serde(default)]
    pub votes: u32,
}

/// One entry of a poll's `userVotes` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub user_id: String,
    pub user_email: String,
    pub option_name: String,
    pub timestamp: i64,
}
