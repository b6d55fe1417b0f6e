//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: YAML file settings and guarded environment accessors
//! - Extensions: dynamic library loading and the live registry
//! - Discord: gateway runtime, slash commands, interaction handling

pub mod config;
pub mod discord;
pub mod extensions;
