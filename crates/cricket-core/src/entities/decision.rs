//! Decision entity - an event's RSVP set or a poll, unified
//!
//! Invariants maintained by the mutators here:
//! - at most one choice per identity
//! - for polls, each option's `count` equals the number of choices naming it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{Choice, DecisionSubject, EventDetails, Identity, PollDetails, RsvpStatus};
use crate::value_objects::{now_millis, DocumentId, IdentityId};

/// Which of the two decision flavours a document is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Event,
    Poll,
}

impl DecisionKind {
    /// Collection name used when nothing else is configured
    pub const fn default_collection(&self) -> &'static str {
        match self {
            Self::Event => "events",
            Self::Poll => "polls",
        }
    }

    /// Document field holding the choice entries
    pub const fn choices_field(&self) -> &'static str {
        match self {
            Self::Event => "rsvps",
            Self::Poll => "userVotes",
        }
    }

    /// Document field holding cached option counts, if this kind keeps them
    pub const fn options_field(&self) -> Option<&'static str> {
        match self {
            Self::Event => None,
            Self::Poll => Some("options"),
        }
    }

    /// Field that listings are ordered by (descending) unless told otherwise
    pub const fn default_sort_field(&self) -> &'static str {
        match self {
            Self::Event => "date",
            Self::Poll => "createdAt",
        }
    }

    /// Whether option counts are cached on the document
    #[inline]
    pub const fn tracks_counts(&self) -> bool {
        matches!(self, Self::Poll)
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => f.write_str("Event"),
            Self::Poll => f.write_str("Poll"),
        }
    }
}

/// A named option with its cached count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub name: String,
    pub count: u32,
}

impl DecisionOption {
    /// Create an option with no votes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
        }
    }
}

/// Decision entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub id: DocumentId,
    pub subject: DecisionSubject,
    pub options: Vec<DecisionOption>,
    pub choices: Vec<Choice>,
    pub owner: Identity,
    pub created_at: DateTime<Utc>,
}

impl Decision {
    /// Create a new, not yet stored event with the fixed RSVP options
    pub fn new_event(owner: Identity, details: EventDetails) -> Self {
        Self {
            id: DocumentId::new(""),
            subject: DecisionSubject::Event(details),
            options: RsvpStatus::ALL
                .iter()
                .map(|status| DecisionOption::new(status.as_str()))
                .collect(),
            choices: Vec::new(),
            owner,
            created_at: now_millis(),
        }
    }

    /// Create a new, not yet stored poll
    pub fn new_poll<I, S>(owner: Identity, question: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: DocumentId::new(""),
            subject: DecisionSubject::Poll(PollDetails {
                question: question.into(),
            }),
            options: options.into_iter().map(DecisionOption::new).collect(),
            choices: Vec::new(),
            owner,
            created_at: now_millis(),
        }
    }

    /// Get the decision kind
    pub fn kind(&self) -> DecisionKind {
        match self.subject {
            DecisionSubject::Event(_) => DecisionKind::Event,
            DecisionSubject::Poll(_) => DecisionKind::Poll,
        }
    }

    /// Event name or poll question
    pub fn title(&self) -> &str {
        self.subject.title()
    }

    /// Check if the decision offers an option with this name
    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|option| option.name == name)
    }

    /// Get the choice currently held by an identity
    pub fn choice_of(&self, identity_id: &IdentityId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.belongs_to(identity_id))
    }

    /// Number of entries held by an identity (0 or 1 while I1 holds)
    pub fn entries_of(&self, identity_id: &IdentityId) -> usize {
        self.choices
            .iter()
            .filter(|choice| choice.belongs_to(identity_id))
            .count()
    }

    /// Check if the identity created this decision
    #[inline]
    pub fn is_owned_by(&self, identity_id: &IdentityId) -> bool {
        self.owner.is(identity_id)
    }

    /// Number of choices naming an option
    pub fn choices_for(&self, option: &str) -> usize {
        self.choices
            .iter()
            .filter(|choice| choice.is_option(option))
            .count()
    }

    /// Check the cached counts against the recorded choices
    ///
    /// Events carry no cached counts and are always consistent.
    pub fn counts_consistent(&self) -> bool {
        if !self.kind().tracks_counts() {
            return true;
        }
        self.options
            .iter()
            .all(|option| option.count as usize == self.choices_for(&option.name))
    }

    /// Remove every entry equal to `choice`, decrementing the cached count
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_choice(&mut self, choice: &Choice) -> bool {
        let before = self.choices.len();
        self.choices.retain(|existing| existing != choice);
        let removed = before - self.choices.len();

        if removed > 0 && self.kind().tracks_counts() {
            if let Some(option) = self.option_mut(&choice.option) {
                option.count = option.count.saturating_sub(removed as u32);
            }
        }
        removed > 0
    }

    /// Append a choice unless an equal entry already exists
    ///
    /// Returns `true` if the choice was added.
    pub fn add_choice(&mut self, choice: Choice) -> bool {
        if self.choices.contains(&choice) {
            return false;
        }
        if self.kind().tracks_counts() {
            if let Some(option) = self.option_mut(&choice.option) {
                option.count += 1;
            }
        }
        self.choices.push(choice);
        true
    }

    /// Re-derive cached counts from the recorded choices
    pub fn recount(&mut self) {
        if !self.kind().tracks_counts() {
            return;
        }
        let counts: Vec<u32> = self
            .options
            .iter()
            .map(|option| self.choices_for(&option.name) as u32)
            .collect();
        for (option, count) in self.options.iter_mut().zip(counts) {
            option.count = count;
        }
    }

    fn option_mut(&mut self, name: &str) -> Option<&mut DecisionOption> {
        self.options.iter_mut().find(|option| option.name == name)
    }
}
