//! Identity of the running installation.

use super::AssociationDomainError;
use crate::routing::domain::same_location;
use camino::{Utf8Path, Utf8PathBuf};

/// The running handler executable and the installation directory that holds
/// its registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationIdentity {
    executable: Utf8PathBuf,
    install_dir: Utf8PathBuf,
}

impl InstallationIdentity {
    /// Derives the identity of the installation containing `executable`.
    ///
    /// # Errors
    ///
    /// Returns [`AssociationDomainError::MissingFileName`] when the path does
    /// not end in a file name, or
    /// [`AssociationDomainError::MissingInstallDir`] when it has no parent.
    pub fn new(executable: impl Into<Utf8PathBuf>) -> Result<Self, AssociationDomainError> {
        let executable_path = executable.into();
        if executable_path.file_name().is_none() {
            return Err(AssociationDomainError::MissingFileName(executable_path));
        }
        let install_dir = install_dir_of(&executable_path)
            .ok_or_else(|| AssociationDomainError::MissingInstallDir(executable_path.clone()))?;
        Ok(Self {
            executable: executable_path,
            install_dir,
        })
    }

    /// Returns the running executable.
    #[must_use]
    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }

    /// Returns the installation directory.
    #[must_use]
    pub fn install_dir(&self) -> &Utf8Path {
        &self.install_dir
    }

    /// Returns whether `owner` is this very executable.
    #[must_use]
    pub fn is_self(&self, owner: &Utf8Path) -> bool {
        same_location(owner, &self.executable)
    }

    /// Returns whether `owner` is another installation of the same handler,
    /// judged by its file name (ASCII case-insensitive).
    #[must_use]
    pub fn is_compatible_owner(&self, owner: &Utf8Path) -> bool {
        match (owner.file_name(), self.executable.file_name()) {
            (Some(theirs), Some(ours)) => theirs.eq_ignore_ascii_case(ours),
            _ => false,
        }
    }
}

/// Returns the non-empty parent directory of `executable`.
pub(crate) fn install_dir_of(executable: &Utf8Path) -> Option<Utf8PathBuf> {
    executable
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .map(Utf8Path::to_path_buf)
}
