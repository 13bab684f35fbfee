//! Core domain entities.
//!
//! - [`Link`] - A short code mapped to a target address with an access counter
//! - [`LinkPage`] - A page of links returned by listing

pub mod link;

pub use link::{Link, LinkPage};
