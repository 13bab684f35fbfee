//! Application layer services implementing the engine operations.
//!
//! Services orchestrate validation, code generation and storage calls. They
//! consume the [`crate::domain::repositories::LinkStore`] trait and give the
//! HTTP handlers and the admin CLI one API to call.
//!
//! # Available Services
//!
//! - [`services::link_allocator::LinkAllocator`] - Link creation and code allocation
//! - [`services::link_resolver::LinkResolver`] - Code resolution with access dispatch
//! - [`services::link_service::LinkService`] - Facade over create, resolve, delete and list
pub mod services;
