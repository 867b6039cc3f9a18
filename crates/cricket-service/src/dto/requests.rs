//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate`. Validation is
//! limited to presence and format checks.

use serde::Deserialize;
use validator::Validate;

use cricket_core::RsvpStatus;

use crate::services::ChoiceIntent;

// ============================================================================
// Auth Requests
// ============================================================================

/// Email and password sign-in
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// ============================================================================
// Event Requests
// ============================================================================

/// Create event request
///
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM`, both read as UTC.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Event name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,

    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// What a user does with an event RSVP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RsvpAction {
    Going,
    Maybe,
    NotGoing,
    Cancel,
}

impl RsvpAction {
    /// Status this action selects, `None` for cancel
    pub fn status(self) -> Option<RsvpStatus> {
        match self {
            Self::Going => Some(RsvpStatus::Going),
            Self::Maybe => Some(RsvpStatus::Maybe),
            Self::NotGoing => Some(RsvpStatus::NotGoing),
            Self::Cancel => None,
        }
    }
}

impl From<RsvpAction> for ChoiceIntent {
    fn from(action: RsvpAction) -> Self {
        match action.status() {
            Some(status) => ChoiceIntent::select(status.as_str()),
            None => ChoiceIntent::Cancel,
        }
    }
}

// ============================================================================
// Poll Requests
// ============================================================================

/// Create poll request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePollRequest {
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,

    /// Comma-separated option names
    #[validate(length(min = 1, message = "Options are required"))]
    pub options: String,
}

impl CreatePollRequest {
    /// Option names: split on commas, trimmed, empties dropped, first of
    /// any duplicates kept
    pub fn option_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.options.split(',').map(str::trim) {
            if !name.is_empty() && !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}
