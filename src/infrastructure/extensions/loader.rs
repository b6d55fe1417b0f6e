//! Extension loader - resolves identifiers to shared libraries and runs
//! their setup entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::application::errors::ExtensionError;
use crate::domain::traits::{Extension, ExtensionEntryFn, ENTRY_SYMBOL};

/// A live extension. The instance must drop before the library that holds
/// its code, hence the field order.
pub struct LoadedExtension {
    instance: Arc<dyn Extension>,
    #[allow(dead_code)]
    library: Library,
}

impl LoadedExtension {
    pub fn extension(&self) -> &dyn Extension {
        self.instance.as_ref()
    }
}

impl std::fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("name", &self.instance.name())
            .finish_non_exhaustive()
    }
}

/// Loads extension libraries from a single directory (non-recursive).
///
/// The extension identifier is the library filename with the platform
/// dynamic-library suffix stripped: `events.so` -> `events`.
pub struct ExtensionLoader {
    directory: PathBuf,
}

impl ExtensionLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Every identifier discoverable on disk right now, sorted.
    pub fn discover(&self) -> Result<Vec<String>, ExtensionError> {
        if !self.directory.exists() {
            tracing::warn!(
                "Extensions directory does not exist: {}",
                self.directory.display()
            );
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            ExtensionError::Internal(format!("Failed to read extensions directory: {e}"))
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if let Some(id) = name.strip_suffix(std::env::consts::DLL_SUFFIX) {
                    if !id.is_empty() {
                        ids.push(id.to_string());
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Load the library for `id` and run its setup entry point.
    pub fn load(&self, id: &str) -> Result<LoadedExtension, ExtensionError> {
        let path = self
            .directory
            .join(format!("{id}{}", std::env::consts::DLL_SUFFIX));
        if !path.exists() {
            return Err(ExtensionError::NotFound);
        }

        let library = unsafe {
            Library::new(&path)
                .map_err(|e| ExtensionError::Internal(format!("Failed to load library: {e}")))?
        };

        let entry: Symbol<ExtensionEntryFn> = unsafe {
            library
                .get(ENTRY_SYMBOL)
                .map_err(|_| ExtensionError::NoEntryPoint)?
        };

        let instance = unsafe {
            let ptr = entry();
            if ptr.is_null() {
                return Err(ExtensionError::Setup("entry point returned null".to_string()));
            }
            Arc::from_raw(ptr)
        };

        instance.setup().map_err(ExtensionError::Setup)?;

        tracing::info!("Loaded extension: {id}");

        Ok(LoadedExtension { instance, library })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("extbot-loader-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn discover_strips_the_library_suffix() {
        let dir = scratch_dir("discover");
        let suffix = std::env::consts::DLL_SUFFIX;
        std::fs::write(dir.join(format!("events{suffix}")), b"").unwrap();
        std::fs::write(dir.join(format!("extension_manage{suffix}")), b"").unwrap();
        std::fs::write(dir.join("README.md"), b"").unwrap();
        std::fs::create_dir(dir.join(format!("nested{suffix}.d"))).unwrap();

        let loader = ExtensionLoader::new(&dir);
        assert_eq!(
            loader.discover().unwrap(),
            vec!["events".to_string(), "extension_manage".to_string()]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn discover_of_a_missing_directory_is_empty() {
        let loader = ExtensionLoader::new("/nonexistent/extbot-extensions");
        assert_eq!(loader.discover().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn load_of_an_unknown_identifier_is_not_found() {
        let dir = scratch_dir("missing");
        let loader = ExtensionLoader::new(&dir);
        assert_eq!(loader.load("events").unwrap_err(), ExtensionError::NotFound);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_of_a_non_library_file_fails_internally() {
        let dir = scratch_dir("garbage");
        let suffix = std::env::consts::DLL_SUFFIX;
        std::fs::write(dir.join(format!("events{suffix}")), b"not a library").unwrap();

        let loader = ExtensionLoader::new(&dir);
        assert!(matches!(
            loader.load("events").unwrap_err(),
            ExtensionError::Internal(_)
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
