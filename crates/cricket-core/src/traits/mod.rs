//! Port traits - what the domain needs from the outside world

mod auth;
mod store;

pub use auth::AuthProvider;
pub use store::{
    DocumentStore, FieldUpdate, Fields, OrderBy, RepoResult, SetMutation, SortDirection,
    StoreCapabilities, StoredDocument,
};
