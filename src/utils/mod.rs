//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_validator`] - Target URL validation
//! - [`timeout`] - Deadlines for store calls

pub mod code_generator;
pub mod timeout;
pub mod url_validator;
