//! Data transfer objects for presentation bindings
//!
//! - Request DTOs with validation for user input
//! - Response DTOs (views) for rendering decisions
//! - Mappers from domain decisions to views

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{CreateEventRequest, CreatePollRequest, RsvpAction, SignInRequest};
pub use responses::{ChoiceResponse, EventView, PollView};
