//! Pagination query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::MAX_PAGE_SIZE;

/// Page size used when the query omits `count`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Offset-based pagination parameters.
///
/// Uses `serde_with` to parse numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<u64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub count: Option<u32>,
}

impl ListParams {
    /// Returns `(offset, count)` with defaults applied.
    ///
    /// # Defaults
    ///
    /// - `offset`: 0
    /// - `count`: 10, clamped to `1..=100`
    pub fn offset_and_count(&self) -> (u64, u32) {
        let offset = self.offset.unwrap_or(0);
        let count = self
            .count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (offset, count)
    }
}
