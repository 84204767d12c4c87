//! In-memory scheme association.

use crate::association::ports::{AssociationError, AssociationResult, SchemeAssociation};
use camino::Utf8Path;
use std::sync::{Arc, RwLock};

/// Scheme association held in memory.
///
/// Writes store the command the Windows adapter would write, so reads go
/// through the same normalisation as real records.
#[derive(Debug, Clone)]
pub struct InMemorySchemeAssociation {
    scheme: String,
    state: Arc<RwLock<AssociationState>>,
}

#[derive(Debug, Default)]
struct AssociationState {
    command: Option<String>,
    deny_writes: bool,
    fail_reads: bool,
    writes: usize,
}

fn lock_error(err: impl std::fmt::Display) -> AssociationError {
    AssociationError::backend(std::io::Error::other(err.to_string()))
}

impl InMemorySchemeAssociation {
    /// Creates an association for `scheme` with nothing stored.
    #[must_use]
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            state: Arc::new(RwLock::new(AssociationState::default())),
        }
    }

    /// Creates an association that already stores `command`.
    #[must_use]
    pub fn with_command(scheme: impl Into<String>, command: impl Into<String>) -> Self {
        let association = Self::new(scheme);
        if let Ok(mut state) = association.state.write() {
            state.command = Some(command.into());
        }
        association
    }

    /// Makes every later write fail with [`AssociationError::Denied`].
    ///
    /// # Errors
    ///
    /// Returns a backend error when lock acquisition fails.
    pub fn deny_writes(&self) -> AssociationResult<()> {
        self.state.write().map_err(lock_error)?.deny_writes = true;
        Ok(())
    }

    /// Makes every later read fail with [`AssociationError::Backend`].
    ///
    /// # Errors
    ///
    /// Returns a backend error when lock acquisition fails.
    pub fn fail_reads(&self) -> AssociationResult<()> {
        self.state.write().map_err(lock_error)?.fail_reads = true;
        Ok(())
    }

    /// Returns the stored command.
    ///
    /// # Errors
    ///
    /// Returns a backend error when lock acquisition fails.
    pub fn command(&self) -> AssociationResult<Option<String>> {
        Ok(self.state.read().map_err(lock_error)?.command.clone())
    }

    /// Returns how many writes succeeded.
    ///
    /// # Errors
    ///
    /// Returns a backend error when lock acquisition fails.
    pub fn write_count(&self) -> AssociationResult<usize> {
        Ok(self.state.read().map_err(lock_error)?.writes)
    }
}

impl SchemeAssociation for InMemorySchemeAssociation {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn read_command(&self) -> AssociationResult<Option<String>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.fail_reads {
            return Err(AssociationError::backend(std::io::Error::other(format!(
                "association record for {} is unreadable",
                self.scheme
            ))));
        }
        Ok(state.command.clone())
    }

    fn write_owner(&self, executable: &Utf8Path) -> AssociationResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.deny_writes {
            return Err(AssociationError::Denied {
                scheme: self.scheme.clone(),
                reason: "access denied".to_owned(),
            });
        }
        state.command = Some(format!("\"{executable}\" \"%1\""));
        state.writes += 1;
        Ok(())
    }
}
