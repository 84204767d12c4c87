//! Normalised view of the OS scheme association.

use crate::association::ports::{AssociationResult, SchemeAssociation};
use crate::routing::domain::stripped_command_line;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tracing::info;

/// Reads and writes the scheme owner as an executable path.
#[derive(Debug)]
pub struct OsBinding<A>
where
    A: SchemeAssociation,
{
    association: Arc<A>,
}

impl<A> Clone for OsBinding<A>
where
    A: SchemeAssociation,
{
    fn clone(&self) -> Self {
        Self {
            association: Arc::clone(&self.association),
        }
    }
}

impl<A> OsBinding<A>
where
    A: SchemeAssociation,
{
    /// Wraps an association adapter.
    #[must_use]
    pub const fn new(association: Arc<A>) -> Self {
        Self { association }
    }

    /// Returns the managed scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.association.scheme()
    }

    /// Returns the executable that owns the scheme, or `None` when nothing
    /// usable is stored.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the adapter.
    pub fn current_owner(&self) -> AssociationResult<Option<Utf8PathBuf>> {
        let owner = self
            .association
            .read_command()?
            .map(|command| stripped_command_line(&command))
            .filter(|path| !path.as_str().is_empty());
        Ok(owner)
    }

    /// Makes `executable` the scheme owner, replacing any previous owner.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the adapter, including denials.
    pub fn set_owner(&self, executable: &Utf8Path) -> AssociationResult<()> {
        self.association.write_owner(executable)?;
        info!(scheme = self.scheme(), %executable, "scheme owner changed");
        Ok(())
    }
}
