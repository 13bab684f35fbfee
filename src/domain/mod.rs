//! Domain layer: the link entity, the storage contract and access counting.
//!
//! Nothing here knows about HTTP or a particular database. Storage backends in
//! [`crate::infrastructure`] implement [`repositories::LinkStore`]; the services
//! in [`crate::application::services`] drive it.
//!
//! # Modules
//!
//! - [`entities`] - [`entities::Link`] and list pages
//! - [`repositories`] - the [`repositories::LinkStore`] trait
//! - [`access_event`] - one pending access increment
//! - [`access_worker`] - the bounded queue and the worker that drains it
//!
//! # Access Flow
//!
//! 1. [`crate::application::services::LinkResolver`] finds the link
//! 2. An [`access_event::AccessEvent`] is handed to the [`access_worker::AccessRecorder`]
//! 3. The target is returned to the caller
//! 4. [`access_worker::run_access_worker`] applies the increment, retrying once

pub mod access_event;
pub mod access_worker;
pub mod entities;
pub mod repositories;
