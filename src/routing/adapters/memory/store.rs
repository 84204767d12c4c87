//! In-memory registry store.

use crate::routing::{
    domain::HandlerTable,
    ports::{RegistryStore, RegistryStoreError, RegistryStoreResult},
};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory registry store keyed by installation directory.
///
/// Installations can be marked corrupt or read-only to exercise the
/// degraded paths of the registry service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistryStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    tables: HashMap<Utf8PathBuf, HandlerTable>,
    corrupt: HashSet<Utf8PathBuf>,
    read_only: HashSet<Utf8PathBuf>,
    saves: usize,
}

fn lock_error(err: impl std::fmt::Display) -> RegistryStoreError {
    RegistryStoreError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryRegistryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored table of `install_dir`, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn table(&self, install_dir: &Utf8Path) -> RegistryStoreResult<Option<HandlerTable>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tables.get(install_dir).cloned())
    }

    /// Returns how many saves have been performed.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn save_count(&self) -> RegistryStoreResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.saves)
    }

    /// Makes loads of `install_dir` fail as if its data were corrupt.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn mark_corrupt(&self, install_dir: &Utf8Path) -> RegistryStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.corrupt.insert(install_dir.to_owned());
        Ok(())
    }

    /// Makes saves to `install_dir` fail.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn mark_read_only(&self, install_dir: &Utf8Path) -> RegistryStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.read_only.insert(install_dir.to_owned());
        Ok(())
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn load(&self, install_dir: &Utf8Path) -> RegistryStoreResult<HandlerTable> {
        let state = self.state.read().map_err(lock_error)?;
        if state.corrupt.contains(install_dir) {
            return Err(RegistryStoreError::invalid_persisted_data(
                std::io::Error::other(format!("corrupt registry at {install_dir}")),
            ));
        }
        Ok(state.tables.get(install_dir).cloned().unwrap_or_default())
    }

    fn save(&self, install_dir: &Utf8Path, table: &HandlerTable) -> RegistryStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.read_only.contains(install_dir) {
            return Err(RegistryStoreError::persistence(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("registry at {install_dir} is read-only"),
            )));
        }
        state.corrupt.remove(install_dir);
        state.tables.insert(install_dir.to_owned(), table.clone());
        state.saves += 1;
        Ok(())
    }
}
