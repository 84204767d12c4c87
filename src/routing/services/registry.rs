//! Per-installation handler registry service.
//!
//! Provides [`HandlerRegistry`], which loads an installation's handler table
//! once and writes it back after every change.

use crate::routing::{
    domain::{Category, HandlerTable, HandlerTarget, RegistrationOutcome},
    ports::{RegistryStore, RegistryStoreError},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for registry mutations.
#[derive(Debug, Error)]
pub enum HandlerRegistryError {
    /// Persisting the changed table failed; the change was not applied.
    #[error(transparent)]
    Store(#[from] RegistryStoreError),
}

/// Result type for registry mutations.
pub type HandlerRegistryResult<T> = Result<T, HandlerRegistryError>;

/// Loads `install_dir`'s table, falling back to an empty one when the stored
/// state is unreadable.
pub(crate) fn load_or_empty<S: RegistryStore + ?Sized>(
    store: &S,
    install_dir: &Utf8Path,
) -> HandlerTable {
    match store.load(install_dir) {
        Ok(table) => table,
        Err(err) => {
            warn!(
                %install_dir,
                error = %err,
                "handler registry unavailable; continuing with an empty registry"
            );
            HandlerTable::new()
        }
    }
}

/// Handler registry of one installation.
///
/// Reads never touch storage after [`HandlerRegistry::open`]. Every change
/// is saved before it becomes visible, so a failed save leaves both the
/// stored and the in-memory table unchanged.
pub struct HandlerRegistry<S, C>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    install_dir: Utf8PathBuf,
    table: HandlerTable,
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> fmt::Debug for HandlerRegistry<S, C>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("install_dir", &self.install_dir)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<S, C> HandlerRegistry<S, C>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    /// Opens the registry of the installation at `install_dir`.
    ///
    /// Never fails: missing, corrupt, or unreadable state yields an empty
    /// registry.
    #[must_use]
    pub fn open(install_dir: impl Into<Utf8PathBuf>, store: Arc<S>, clock: Arc<C>) -> Self {
        let dir = install_dir.into();
        let table = load_or_empty(&*store, &dir);
        debug!(
            install_dir = %dir,
            handlers = table.handlers().count(),
            proxies = table.proxies().len(),
            "opened handler registry"
        );
        Self {
            install_dir: dir,
            table,
            store,
            clock,
        }
    }

    /// Returns the installation directory this registry belongs to.
    #[must_use]
    pub fn install_dir(&self) -> &Utf8Path {
        &self.install_dir
    }

    /// Returns the current table.
    #[must_use]
    pub const fn table(&self) -> &HandlerTable {
        &self.table
    }

    /// Returns the handler mapped to `category` in this installation only.
    #[must_use]
    pub fn lookup(&self, category: &Category) -> Option<&Utf8Path> {
        self.table.lookup(category)
    }

    /// Returns the catch-all handler of this installation.
    #[must_use]
    pub fn default_handler(&self) -> Option<&Utf8Path> {
        self.table.default_handler().map(|entry| entry.executable())
    }

    /// Returns proxy installation directories in fallback order.
    #[must_use]
    pub fn proxies(&self) -> &[Utf8PathBuf] {
        self.table.proxies()
    }

    /// Returns whether first-run registration prompts are suppressed.
    #[must_use]
    pub const fn no_register(&self) -> bool {
        self.table.no_register()
    }

    /// Maps `category` to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the change cannot be
    /// persisted.
    pub fn register_category(
        &mut self,
        category: &Category,
        handler: &Utf8Path,
        overwrite: bool,
    ) -> HandlerRegistryResult<RegistrationOutcome> {
        self.register(&HandlerTarget::Category(category.clone()), handler, overwrite)
    }

    /// Points `target` at `handler`.
    ///
    /// When the slot is occupied and `overwrite` is false nothing is written
    /// and [`RegistrationOutcome::AlreadySet`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the change cannot be
    /// persisted.
    pub fn register(
        &mut self,
        target: &HandlerTarget,
        handler: &Utf8Path,
        overwrite: bool,
    ) -> HandlerRegistryResult<RegistrationOutcome> {
        let mut next = self.table.clone();
        let outcome = next.register(target, handler, overwrite, &*self.clock);
        if outcome == RegistrationOutcome::AlreadySet {
            debug!(
                handler_target = %target,
                install_dir = %self.install_dir,
                "handler already set; keeping it"
            );
            return Ok(outcome);
        }

        self.commit(next)?;
        info!(
            handler_target = %target,
            %handler,
            install_dir = %self.install_dir,
            "registered handler"
        );
        Ok(outcome)
    }

    /// Points every target in `targets` at `handler`, returning one outcome
    /// per target.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] on the first change that cannot
    /// be persisted; earlier targets stay registered.
    pub fn register_all(
        &mut self,
        targets: &[HandlerTarget],
        handler: &Utf8Path,
        overwrite: bool,
    ) -> HandlerRegistryResult<Vec<(HandlerTarget, RegistrationOutcome)>> {
        targets
            .iter()
            .map(|target| {
                self.register(target, handler, overwrite)
                    .map(|outcome| (target.clone(), outcome))
            })
            .collect()
    }

    /// Clears `target`. Returns whether a handler was removed.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the change cannot be
    /// persisted.
    pub fn unregister(&mut self, target: &HandlerTarget) -> HandlerRegistryResult<bool> {
        let mut next = self.table.clone();
        if !next.unregister(target) {
            return Ok(false);
        }
        self.commit(next)?;
        info!(
            handler_target = %target,
            install_dir = %self.install_dir,
            "unregistered handler"
        );
        Ok(true)
    }

    /// Adds `install_dir` as a fallback installation. Idempotent; returns
    /// whether the proxy list changed.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the change cannot be
    /// persisted.
    pub fn register_proxy(&mut self, install_dir: &Utf8Path) -> HandlerRegistryResult<bool> {
        let mut next = self.table.clone();
        if !next.add_proxy(install_dir) {
            return Ok(false);
        }
        self.commit(next)?;
        info!(
            proxy = %install_dir,
            owner_dir = %self.install_dir,
            "registered proxy installation"
        );
        Ok(true)
    }

    /// Removes `install_dir` from the fallback installations. Returns whether
    /// the proxy list changed.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the change cannot be
    /// persisted.
    pub fn unregister_proxy(&mut self, install_dir: &Utf8Path) -> HandlerRegistryResult<bool> {
        let mut next = self.table.clone();
        if !next.remove_proxy(install_dir) {
            return Ok(false);
        }
        self.commit(next)?;
        info!(
            proxy = %install_dir,
            owner_dir = %self.install_dir,
            "removed proxy installation"
        );
        Ok(true)
    }

    /// Sets whether first-run registration prompts are suppressed.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the change cannot be
    /// persisted.
    pub fn set_no_register(&mut self, value: bool) -> HandlerRegistryResult<()> {
        let mut next = self.table.clone();
        if next.set_no_register(value) {
            self.commit(next)?;
        }
        Ok(())
    }

    /// Writes the current table to storage, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerRegistryError::Store`] when the write fails.
    pub fn persist(&self) -> HandlerRegistryResult<()> {
        self.store.save(&self.install_dir, &self.table)?;
        Ok(())
    }

    fn commit(&mut self, next: HandlerTable) -> HandlerRegistryResult<()> {
        self.store.save(&self.install_dir, &next)?;
        self.table = next;
        Ok(())
    }
}
