//! # cricket-db
//!
//! Document layer for decisions.
//!
//! ## Overview
//!
//! The hosted document database is reached only through the
//! [`DocumentStore`](cricket_core::DocumentStore) port. This crate provides:
//!
//! - Document models with the field layout the hosted collections use
//! - Decision ↔ document mappers
//! - [`InMemoryDocumentStore`], a process-local store with the same set
//!   semantics, ordering and optional atomic batches, plus write fault
//!   injection for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cricket_core::{DecisionKind, DocumentStore, OrderBy};
//! use cricket_db::{mappers, InMemoryDocumentStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryDocumentStore::new_shared();
//!     let docs = store.get_all("polls", &OrderBy::desc("createdAt")).await?;
//!     for doc in docs {
//!         let poll = mappers::decision_from_document(DecisionKind::Poll, doc)?;
//!         println!("{}", poll.title());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mappers;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use mappers::{choice_to_value, decision_from_document, decision_to_fields, options_to_value};
pub use models::{EventDocument, OptionRecord, PollDocument, RsvpRecord, VoteRecord};
pub use store::{InMemoryDocumentStore, WriteKind};
