//! Integration test utilities for the choice engine
//!
//! This crate wires the services to the in-memory document store and auth
//! provider, with several signed-in users sharing one store.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
