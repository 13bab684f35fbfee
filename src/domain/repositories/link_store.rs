//! Storage contract for links.

use crate::domain::entities::{Link, LinkPage};
use crate::error::AppError;
use async_trait::async_trait;

/// Result of an atomic insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The code was free and the new record is returned in full.
    Inserted(Link),
    /// A live link already holds this code. Nothing was written.
    CodeTaken,
}

/// Durable keyed storage for links.
///
/// The store owns every cross-request guarantee of the engine: code
/// uniqueness is decided by [`LinkStore::try_insert`] alone and access
/// increments must never be lost under concurrency.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Errors
///
/// Every method returns [`AppError::Unavailable`] for transient backend
/// failures and [`AppError::Storage`] for anything else. "Not found" is
/// reported through the return value, never as an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Inserts a new link only if `code` is not held by a live link.
    ///
    /// Check and write happen as one atomic step; this is the only
    /// uniqueness gate.
    async fn try_insert(&self, code: &str, target: &str) -> Result<InsertOutcome, AppError>;

    /// Finds a link by its code.
    async fn get(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically increments `access_count` and refreshes `updated_at`.
    ///
    /// Returns `Ok(false)` if no link has this id.
    async fn increment_access(&self, id: i64) -> Result<bool, AppError>;

    /// Removes a link and frees its code for reuse.
    ///
    /// Returns `Ok(false)` if no link has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists links by `created_at` ascending (ties broken by id).
    async fn list(&self, offset: u64, count: u32) -> Result<LinkPage, AppError>;

    /// Confirms the backend is reachable without touching link data.
    async fn ping(&self) -> Result<(), AppError>;
}
