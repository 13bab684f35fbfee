//! Storage trait definitions for the domain layer.
//!
//! The engine only talks to storage through [`LinkStore`]. Concrete backends
//! live in `crate::infrastructure::persistence`; a mock is generated with
//! `mockall` for unit tests.

pub mod link_store;

pub use link_store::{InsertOutcome, LinkStore};

#[cfg(test)]
pub use link_store::MockLinkStore;
