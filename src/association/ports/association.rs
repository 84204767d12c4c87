//! OS scheme association port.

use camino::Utf8Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for association operations.
pub type AssociationResult<T> = Result<T, AssociationError>;

/// Read/write access to the OS record that maps a scheme to an executable.
pub trait SchemeAssociation: Send + Sync {
    /// Returns the scheme this association manages.
    fn scheme(&self) -> &str;

    /// Reads the raw command stored for the scheme, such as
    /// `"C:\App\app.exe" "%1"`. Returns `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError::Backend`] when the record cannot be read.
    fn read_command(&self) -> AssociationResult<Option<String>>;

    /// Points the scheme at `executable`, replacing any previous owner.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationError::Denied`] when the OS refuses the write, or
    /// [`AssociationError::Backend`] for other failures.
    fn write_owner(&self, executable: &Utf8Path) -> AssociationResult<()>;
}

/// Errors returned by scheme association adapters.
#[derive(Debug, Clone, Error)]
pub enum AssociationError {
    /// The OS refused to change the association.
    #[error("not permitted to associate {scheme}:// links: {reason}")]
    Denied {
        /// Scheme being written.
        scheme: String,
        /// OS-supplied reason.
        reason: String,
    },

    /// The association record could not be accessed.
    #[error("scheme association error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssociationError {
    /// Wraps a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Maps an I/O failure, treating permission errors as a denial.
    pub fn from_io(scheme: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::Denied {
                scheme: scheme.to_owned(),
                reason: err.to_string(),
            };
        }
        Self::backend(err)
    }
}
