//! The contract every loadable extension implements.
//!
//! Concrete extensions live in shared libraries under the extensions
//! directory and export [`ENTRY_SYMBOL`]. The contract is a trait, so a
//! "bare" extension cannot be constructed; only concrete implementations
//! behind the entry point exist.

/// Symbol every extension library must export.
pub const ENTRY_SYMBOL: &[u8] = b"extension_entry";

/// Function signature of the exported entry point.
pub type ExtensionEntryFn = extern "C" fn() -> *mut dyn Extension;

/// An independently loadable unit of bot behavior.
pub trait Extension: Send + Sync {
    /// Unique identifier, matching the library filename stem.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Invoked when the extension is loaded or reloaded. A failure here
    /// aborts the load and is reported to the operator.
    fn setup(&self) -> Result<(), String>;

    /// Invoked when the extension is unloaded or reloaded.
    fn teardown(&self) {}
}
