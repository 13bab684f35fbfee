//! Business logic services for the application layer.

pub mod link_allocator;
pub mod link_resolver;
pub mod link_service;

pub use link_allocator::{AllocationPolicy, DEFAULT_MAX_ATTEMPTS, LinkAllocator};
pub use link_resolver::{LinkResolver, Resolution};
pub use link_service::{LinkService, MAX_PAGE_SIZE};
