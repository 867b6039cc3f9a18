//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use cricket_service::dto::{CreateEventRequest, CreatePollRequest};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Password every test account uses
pub const TEST_PASSWORD: &str = "TestPass123!";

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Unique email address for a named player
pub fn unique_email(name: &str) -> String {
    format!("{name}{}@example.com", unique_suffix())
}

/// An evening net session
pub fn event_request() -> CreateEventRequest {
    CreateEventRequest {
        name: format!("Nets {}", unique_suffix()),
        date: "2026-06-12".to_string(),
        time: "19:00".to_string(),
        location: "The Oval".to_string(),
        description: Some("Bring your own pads".to_string()),
    }
}

/// A poll with options `A` and `B`
pub fn poll_request() -> CreatePollRequest {
    poll_request_with("A, B")
}

/// A poll with the given comma-separated options
pub fn poll_request_with(options: &str) -> CreatePollRequest {
    CreatePollRequest {
        question: format!("Which side? #{}", unique_suffix()),
        options: options.to_string(),
    }
}
