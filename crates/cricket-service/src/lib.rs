//! # cricket-service
//!
//! Application layer: the choice consistency engine, the session gate, the
//! decision repository, and the event/poll services with their DTOs.

pub mod dto;
pub mod services;

pub use services::{
    ChoiceEngine, ChoiceIntent, ChoiceOutcome, ChoicePlan, ChoiceStage, DecisionRepository,
    EventService, PollService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SessionGate, SessionState, Subscription,
};
