//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Errors: the crate-wide error taxonomy
//! - Lifecycle: the extension lifecycle manager and its selection prompt

pub mod errors;
pub mod lifecycle;
