//! JSON file registry store living inside each installation directory.

use crate::routing::{
    domain::HandlerTable,
    ports::{RegistryStore, RegistryStoreError, RegistryStoreResult},
};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use tracing::debug;

/// File name of the registry inside an installation directory.
pub const REGISTRY_FILE_NAME: &str = "linkhandler.json";

/// Registry store that keeps one JSON document per installation directory.
///
/// Writes go to a process-unique temporary file that is then renamed over
/// the registry, so concurrent readers see either the old or the new table.
#[derive(Debug, Clone)]
pub struct JsonFileRegistryStore {
    file_name: String,
}

impl JsonFileRegistryStore {
    /// Creates a store using [`REGISTRY_FILE_NAME`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_file_name(REGISTRY_FILE_NAME)
    }

    /// Creates a store using a custom file name inside each installation.
    #[must_use]
    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Returns the registry file name used inside each installation.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Default for JsonFileRegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore for JsonFileRegistryStore {
    fn load(&self, install_dir: &Utf8Path) -> RegistryStoreResult<HandlerTable> {
        let dir = match Dir::open_ambient_dir(install_dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(%install_dir, "installation directory missing; using empty registry");
                return Ok(HandlerTable::new());
            }
            Err(err) => return Err(RegistryStoreError::persistence(err)),
        };

        let contents = match dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(%install_dir, "no registry file yet; using empty registry");
                return Ok(HandlerTable::new());
            }
            Err(err) => return Err(RegistryStoreError::persistence(err)),
        };

        if contents.trim().is_empty() {
            return Ok(HandlerTable::new());
        }
        serde_json::from_str(&contents).map_err(RegistryStoreError::invalid_persisted_data)
    }

    fn save(&self, install_dir: &Utf8Path, table: &HandlerTable) -> RegistryStoreResult<()> {
        let dir = Dir::open_ambient_dir(install_dir, ambient_authority())
            .map_err(RegistryStoreError::persistence)?;
        let mut document =
            serde_json::to_string_pretty(table).map_err(RegistryStoreError::persistence)?;
        document.push('\n');

        let staging_name = format!("{}.{}.tmp", self.file_name, std::process::id());
        dir.write(&staging_name, document.as_bytes())
            .map_err(RegistryStoreError::persistence)?;
        if let Err(err) = dir.rename(&staging_name, &dir, &self.file_name) {
            if let Err(cleanup_err) = dir.remove_file(&staging_name) {
                debug!(%install_dir, error = %cleanup_err, "failed to remove staging registry file");
            }
            return Err(RegistryStoreError::persistence(err));
        }

        debug!(%install_dir, file = %self.file_name, "persisted handler registry");
        Ok(())
    }
}
