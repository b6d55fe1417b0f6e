//! Domain traits - Abstractions for infrastructure implementations

pub mod extension;
pub mod registry;

pub use extension::{Extension, ExtensionEntryFn, ENTRY_SYMBOL};
pub use registry::ExtensionRegistry;
