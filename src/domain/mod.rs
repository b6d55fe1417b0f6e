//! Domain layer - Core types with no external dependencies
//!
//! This layer contains:
//! - Entities: lifecycle operations and their outcomes
//! - Traits: abstractions for infrastructure (Extension, ExtensionRegistry)

pub mod entities;
pub mod traits;
