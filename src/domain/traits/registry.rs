use async_trait::async_trait;

use crate::application::errors::ExtensionError;

/// Registry trait - abstraction over the process-wide set of active
/// extensions.
///
/// The lifecycle manager never holds its own copy of this state: every read
/// is a fresh snapshot, and every mutation goes through one of the three
/// lifecycle calls. Injecting the registry (rather than reaching for a
/// global) lets tests substitute a fake.
#[async_trait]
pub trait ExtensionRegistry: Send + Sync {
    /// Load an extension by identifier and run its setup entry point.
    async fn load(&mut self, id: &str) -> Result<(), ExtensionError>;

    /// Tear down and unload an active extension.
    async fn unload(&mut self, id: &str) -> Result<(), ExtensionError>;

    /// Unload then freshly load an active extension.
    async fn reload(&mut self, id: &str) -> Result<(), ExtensionError>;

    /// Identifiers of currently active extensions, sorted.
    fn list_active(&self) -> Vec<String>;

    /// Identifiers of every extension discoverable on disk, sorted.
    fn list_discoverable(&self) -> Result<Vec<String>, ExtensionError>;
}
