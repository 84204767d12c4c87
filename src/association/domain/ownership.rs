//! Classification of the current scheme owner.

use super::InstallationIdentity;
use super::identity::install_dir_of;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Who owns the scheme, relative to this installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipState {
    /// No executable is associated with the scheme.
    Unregistered,
    /// This executable owns the scheme.
    OwnedBySelf,
    /// Another installation of this handler owns the scheme and is present.
    OwnedByOtherValid {
        /// Owning executable.
        owner: Utf8PathBuf,
    },
    /// The associated executable no longer exists.
    OwnedByOtherStale {
        /// Missing executable.
        owner: Utf8PathBuf,
    },
    /// The owner could not be read, or it is a different program whose
    /// registry cannot be joined.
    Undetermined {
        /// Foreign executable, when one was read.
        owner: Option<Utf8PathBuf>,
    },
}

impl OwnershipState {
    /// Classifies `owner` for `identity`, probing existence with `exists`.
    ///
    /// `owner` is the normalised executable read from the OS, or `None` when
    /// nothing is associated.
    #[must_use]
    pub fn classify(
        owner: Option<&Utf8Path>,
        identity: &InstallationIdentity,
        exists: impl Fn(&Utf8Path) -> bool,
    ) -> Self {
        let Some(path) = owner else {
            return Self::Unregistered;
        };
        if identity.is_self(path) {
            return Self::OwnedBySelf;
        }
        if !exists(path) {
            return Self::OwnedByOtherStale {
                owner: path.to_owned(),
            };
        }
        if identity.is_compatible_owner(path) && install_dir_of(path).is_some() {
            return Self::OwnedByOtherValid {
                owner: path.to_owned(),
            };
        }
        Self::Undetermined {
            owner: Some(path.to_owned()),
        }
    }

    /// Returns the owning executable carried by this state, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unregistered | Self::OwnedBySelf => None,
            Self::OwnedByOtherValid { owner } | Self::OwnedByOtherStale { owner } => Some(owner),
            Self::Undetermined { owner } => owner.as_deref(),
        }
    }

    /// Returns the installation directory of a valid foreign owner.
    #[must_use]
    pub fn owner_install_dir(&self) -> Option<Utf8PathBuf> {
        match self {
            Self::OwnedByOtherValid { owner } => install_dir_of(owner),
            _ => None,
        }
    }

    /// Returns a stable name for logs and listings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::OwnedBySelf => "owned_by_self",
            Self::OwnedByOtherValid { .. } => "owned_by_other_valid",
            Self::OwnedByOtherStale { .. } => "owned_by_other_stale",
            Self::Undetermined { .. } => "undetermined",
        }
    }
}

impl fmt::Display for OwnershipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
