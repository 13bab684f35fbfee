//! Access event model for asynchronous counter updates.

/// One successful resolution of a short code, waiting to be counted.
///
/// Created by [`crate::application::services::LinkResolver`] after the target
/// has been handed to the caller, and consumed by
/// [`crate::domain::access_worker::run_access_worker`]. Each event results in
/// exactly one [`crate::domain::repositories::LinkStore::increment_access`]
/// call (plus at most one retry on a transient failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub link_id: i64,
    pub code: String,
}

impl AccessEvent {
    pub fn new(link_id: i64, code: impl Into<String>) -> Self {
        Self {
            link_id,
            code: code.into(),
        }
    }
}
