//! Persistence port for per-installation handler tables.

use crate::routing::domain::HandlerTable;
use camino::Utf8Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry store operations.
pub type RegistryStoreResult<T> = Result<T, RegistryStoreError>;

/// Persistence contract for handler tables, keyed by installation directory.
pub trait RegistryStore: Send + Sync {
    /// Loads the table of the installation at `install_dir`.
    ///
    /// Missing state is not an error: implementations return an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryStoreError::InvalidPersistedData`] when stored data
    /// cannot be decoded, or [`RegistryStoreError::Persistence`] when the
    /// storage cannot be read.
    fn load(&self, install_dir: &Utf8Path) -> RegistryStoreResult<HandlerTable>;

    /// Replaces the stored table of the installation at `install_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryStoreError::Persistence`] when the write fails.
    fn save(&self, install_dir: &Utf8Path, table: &HandlerTable) -> RegistryStoreResult<()>;
}

/// Errors returned by registry store implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryStoreError {
    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted handler registry: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("handler registry persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryStoreError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
