//! Utility functions for code generation and target validation.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`target_validator`] - Redirect target safety policy

pub mod code_generator;
pub mod target_validator;
