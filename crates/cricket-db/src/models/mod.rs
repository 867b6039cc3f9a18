//! Document models - serde structs matching the stored field layout

mod event;
mod poll;

pub use event::{EventDocument, RsvpRecord};
pub use poll::{OptionRecord, PollDocument, VoteRecord};
