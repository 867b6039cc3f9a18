//! Choice entity - one identity's selected option within a decision

use chrono::{DateTime, Utc};

use crate::entities::Identity;
use crate::value_objects::{now_millis, IdentityId};

/// A single identity's recorded choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub identity_id: IdentityId,
    pub identity_email: String,
    pub option: String,
    pub recorded_at: DateTime<Utc>,
}

impl Choice {
    /// Record a choice for `identity` at the current instant
    pub fn new(identity: &Identity, option: impl Into<String>) -> Self {
        Self::at(identity, option, now_millis())
    }

    /// Record a choice at an explicit instant
    pub fn at(identity: &Identity, option: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            identity_id: identity.id.clone(),
            identity_email: identity.email.clone(),
            option: option.into(),
            recorded_at,
        }
    }

    /// Check if this choice was made by the given identity
    #[inline]
    pub fn belongs_to(&self, identity_id: &IdentityId) -> bool {
        &self.identity_id == identity_id
    }

    /// Check if this choice selects the given option
    #[inline]
    pub fn is_option(&self, option: &str) -> bool {
        self.option == option
    }
}
