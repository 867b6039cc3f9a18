//! Domain entities - core business objects

mod choice;
mod decision;
mod identity;
mod subject;

pub use choice::Choice;
pub use decision::{Decision, DecisionKind, DecisionOption};
pub use identity::Identity;
pub use subject::{DecisionSubject, EventDetails, PollDetails, RsvpStatus};
