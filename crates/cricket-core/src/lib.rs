//! # cricket-core
//!
//! Domain layer containing decisions, choices, the tally projection, and the
//! port traits for the document store and the auth provider.
//! This crate has zero dependencies on infrastructure (store vendor, auth vendor, etc.).

pub mod entities;
pub mod error;
pub mod projections;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Choice, Decision, DecisionKind, DecisionOption, DecisionSubject, EventDetails, Identity,
    PollDetails, RsvpStatus,
};
pub use error::DomainError;
pub use projections::{project, project_for, OptionTally, Tally};
pub use traits::{
    AuthProvider, DocumentStore, FieldUpdate, Fields, OrderBy, RepoResult, SetMutation, SortDirection,
    StoreCapabilities, StoredDocument,
};
pub use value_objects::{now_millis, truncate_to_millis, DocumentId, IdentityId};
