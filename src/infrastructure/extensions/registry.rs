//! Live extension registry backed by the dynamic loader.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use super::loader::{ExtensionLoader, LoadedExtension};
use crate::application::errors::ExtensionError;
use crate::domain::traits::ExtensionRegistry;

/// The process-wide set of active extensions.
///
/// Owns each loaded library for as long as its extension is active; dropping
/// the [`LoadedExtension`] unloads the code. Callers serialize access through
/// the lifecycle manager's lock.
pub struct LiveRegistry {
    loader: ExtensionLoader,
    active: HashMap<String, LoadedExtension>,
}

impl LiveRegistry {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            loader: ExtensionLoader::new(directory),
            active: HashMap::new(),
        }
    }

    fn remove(&mut self, id: &str) -> Result<(), ExtensionError> {
        match self.active.remove(id) {
            Some(loaded) => {
                loaded.extension().teardown();
                drop(loaded);
                tracing::info!("Unloaded extension: {id}");
                Ok(())
            }
            None => Err(ExtensionError::NotLoaded),
        }
    }
}

#[async_trait]
impl ExtensionRegistry for LiveRegistry {
    async fn load(&mut self, id: &str) -> Result<(), ExtensionError> {
        if self.active.contains_key(id) {
            return Err(ExtensionError::AlreadyLoaded);
        }
        let loaded = self.loader.load(id)?;
        self.active.insert(id.to_string(), loaded);
        Ok(())
    }

    async fn unload(&mut self, id: &str) -> Result<(), ExtensionError> {
        self.remove(id)
    }

    async fn reload(&mut self, id: &str) -> Result<(), ExtensionError> {
        if !self.active.contains_key(id) {
            return Err(ExtensionError::NotLoaded);
        }
        self.remove(id)?;
        match self.loader.load(id) {
            Ok(loaded) => {
                self.active.insert(id.to_string(), loaded);
                Ok(())
            }
            // The file was present when the extension first loaded; losing it
            // mid-reload is not a plain "not found" from the operator's view.
            Err(ExtensionError::NotFound) => Err(ExtensionError::Internal(format!(
                "extension file for {id} disappeared during reload"
            ))),
            Err(e) => Err(e),
        }
    }

    fn list_active(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn list_discoverable(&self) -> Result<Vec<String>, ExtensionError> {
        self.loader.discover()
    }
}
