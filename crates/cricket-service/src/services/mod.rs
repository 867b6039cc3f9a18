//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and are cheap to construct per call.

pub mod choice;
pub mod context;
pub mod decision;
pub mod error;
pub mod event;
pub mod poll;
pub mod session;

pub use choice::{ChoiceEngine, ChoiceIntent, ChoiceOutcome, ChoicePlan};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use decision::DecisionRepository;
pub use error::{ChoiceStage, ServiceError, ServiceResult};
pub use event::EventService;
pub use poll::PollService;
pub use session::{SessionGate, SessionState, Subscription};
