//! Document store adapters

mod memory;

pub use memory::{InMemoryDocumentStore, WriteKind};
