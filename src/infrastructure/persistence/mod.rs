//! Link store implementations.
//!
//! - [`PgLinkStore`] - PostgreSQL via SQLx, used in production
//! - [`InMemoryLinkStore`] - Process-local `DashMap` store for development and tests

pub mod memory_link_store;
pub mod pg_link_store;

pub use memory_link_store::InMemoryLinkStore;
pub use pg_link_store::PgLinkStore;
