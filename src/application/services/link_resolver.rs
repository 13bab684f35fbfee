//! Code resolution with deferred access counting.

use std::sync::Arc;

use serde_json::json;

use crate::domain::access_event::AccessEvent;
use crate::domain::access_worker::AccessRecorder;
use crate::domain::repositories::LinkStore;
use crate::error::AppError;

/// Target of a resolved code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub link_id: i64,
    pub target: String,
}

/// Resolves codes to targets and dispatches one access increment per hit.
///
/// The caller gets the target as soon as the lookup succeeds. The increment
/// is handed to the [`AccessRecorder`] and becomes durable later; a failed
/// lookup dispatches nothing.
pub struct LinkResolver {
    store: Arc<dyn LinkStore>,
    recorder: AccessRecorder,
}

impl LinkResolver {
    pub fn new(store: Arc<dyn LinkStore>, recorder: AccessRecorder) -> Self {
        Self { store, recorder }
    }

    /// Looks up `code` and schedules its access increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no live link holds the code.
    /// Storage errors are returned unchanged.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        let link = self.store.get(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

        self.recorder.record(AccessEvent::new(link.id, link.code));

        Ok(Resolution {
            link_id: link.id,
            target: link.target,
        })
    }
}
