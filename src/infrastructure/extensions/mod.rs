//! Extension system
//!
//! Extensions are shared libraries in the extensions directory. Each exports
//! an `extension_entry` function returning an implementation of the
//! `Extension` trait; `setup` runs on load and reload, `teardown` on unload
//! and reload. Loading an extension mutates live bot behavior - that side
//! effect is the point.

pub mod loader;
pub mod registry;

pub use loader::{ExtensionLoader, LoadedExtension};
pub use registry::LiveRegistry;
