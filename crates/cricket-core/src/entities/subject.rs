//! What a decision is about: an event to RSVP to, or a poll question

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RSVP status - the fixed option set of every event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RsvpStatus {
    Going,
    Maybe,
    NotGoing,
}

impl RsvpStatus {
    /// All statuses, in display order
    pub const ALL: [RsvpStatus; 3] = [Self::Going, Self::Maybe, Self::NotGoing];

    /// Option name as stored in documents
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Maybe => "maybe",
            Self::NotGoing => "not-going",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "going" => Ok(Self::Going),
            "maybe" => Ok(Self::Maybe),
            "not-going" => Ok(Self::NotGoing),
            _ => Err(format!("Invalid RSVP status: {s}")),
        }
    }
}

/// Event-specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: Option<String>,
}

/// Poll-specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDetails {
    pub question: String,
}

/// Subject of a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionSubject {
    Event(EventDetails),
    Poll(PollDetails),
}

impl DecisionSubject {
    /// Human-readable title: event name or poll question
    pub fn title(&self) -> &str {
        match self {
            Self::Event(event) => &event.name,
            Self::Poll(poll) => &poll.question,
        }
    }
}
