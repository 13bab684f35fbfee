//! Link entity representing a short code to target mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored link with its access counter.
///
/// `id`, `code`, `target` and `created_at` never change after creation.
/// `access_count` and `updated_at` move together on every recorded access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a freshly inserted link with a zero access count.
    pub fn new(id: i64, code: String, target: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            target,
            access_count: 0,
            created_at,
            updated_at: created_at,
        }
    }

    /// Records one access, advancing `updated_at` monotonically.
    pub fn record_access(&mut self, at: DateTime<Utc>) {
        self.access_count += 1;
        self.updated_at = at.max(self.updated_at);
    }
}

/// One page of links ordered by creation time, plus the overall total.
#[derive(Debug, Clone, Serialize)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: u64,
}
