//! Identity entity - an authenticated principal

use serde::{Deserialize, Serialize};

use crate::value_objects::IdentityId;

/// Authenticated user's principal: stable id plus email
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
}

impl Identity {
    /// Create a new Identity
    pub fn new(id: impl Into<IdentityId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Check if this identity is the given principal
    #[inline]
    pub fn is(&self, id: &IdentityId) -> bool {
        &self.id == id
    }
}
