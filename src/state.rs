//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::access_worker::AccessRecorder;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Kept alongside the service so health checks can inspect the queue.
    pub access_recorder: AccessRecorder,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>, access_recorder: AccessRecorder) -> Self {
        Self {
            link_service,
            access_recorder,
        }
    }
}
