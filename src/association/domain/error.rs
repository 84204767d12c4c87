//! Error types for association domain validation.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors returned while constructing association domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssociationDomainError {
    /// The executable path has no parent directory to act as installation
    /// directory.
    #[error("executable {0} has no installation directory")]
    MissingInstallDir(Utf8PathBuf),

    /// The executable path has no file name.
    #[error("executable path {0} does not name a file")]
    MissingFileName(Utf8PathBuf),
}
