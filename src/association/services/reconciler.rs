//! Startup reconciliation of scheme ownership and handler registries.

use super::OsBinding;
use crate::association::{
    domain::{ConsentAnswer, ConsentQuestion, InstallationIdentity, OwnershipState},
    ports::{AssociationError, ConsentPrompt, SchemeAssociation},
};
use crate::routing::{
    domain::HandlerTarget,
    ports::RegistryStore,
    services::{HandlerRegistry, HandlerRegistryError},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-run inputs that steer reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileDirective {
    force_registration: bool,
    suppress_prompts: bool,
}

impl ReconcileDirective {
    /// Creates a directive that neither forces nor suppresses anything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            force_registration: false,
            suppress_prompts: false,
        }
    }

    /// Asks to claim the scheme even when suppressed or owned elsewhere.
    #[must_use]
    pub const fn with_force_registration(mut self, force: bool) -> Self {
        self.force_registration = force;
        self
    }

    /// Suppresses claim prompts as the stored "don't ask again" flag does.
    #[must_use]
    pub const fn with_suppressed_prompts(mut self, suppress: bool) -> Self {
        self.suppress_prompts = suppress;
        self
    }

    /// Returns whether registration is forced.
    #[must_use]
    pub const fn force_registration(&self) -> bool {
        self.force_registration
    }

    /// Returns whether claim prompts are suppressed by the caller.
    #[must_use]
    pub const fn suppress_prompts(&self) -> bool {
        self.suppress_prompts
    }
}

/// Errors that abort reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The OS association could not be changed; nothing was committed.
    #[error(transparent)]
    Association(#[from] AssociationError),

    /// A registry change could not be persisted.
    #[error(transparent)]
    Registry(#[from] HandlerRegistryError),
}

/// Result of reconciling ownership at startup.
pub struct ReconcileOutcome<S, C>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    state: OwnershipState,
    registry: Option<HandlerRegistry<S, C>>,
    ownership_changed: bool,
    unjoined_owner: Option<Utf8PathBuf>,
}

impl<S, C> fmt::Debug for ReconcileOutcome<S, C>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcileOutcome")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("ownership_changed", &self.ownership_changed)
            .field("unjoined_owner", &self.unjoined_owner)
            .finish()
    }
}

impl<S, C> ReconcileOutcome<S, C>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    const fn passive(state: OwnershipState) -> Self {
        Self {
            state,
            registry: None,
            ownership_changed: false,
            unjoined_owner: None,
        }
    }

    const fn active(
        state: OwnershipState,
        registry: HandlerRegistry<S, C>,
        ownership_changed: bool,
    ) -> Self {
        Self {
            state,
            registry: Some(registry),
            ownership_changed,
            unjoined_owner: None,
        }
    }

    fn with_unjoined_owner(mut self, owner_dir: Option<Utf8PathBuf>) -> Self {
        self.unjoined_owner = owner_dir;
        self
    }

    /// Returns the ownership state observed before any change.
    #[must_use]
    pub const fn state(&self) -> &OwnershipState {
        &self.state
    }

    /// Returns the registry to dispatch with; `None` means the run is
    /// passive.
    #[must_use]
    pub const fn registry(&self) -> Option<&HandlerRegistry<S, C>> {
        self.registry.as_ref()
    }

    /// Returns whether this run changed the scheme owner.
    #[must_use]
    pub const fn ownership_changed(&self) -> bool {
        self.ownership_changed
    }

    /// Returns the installation directory of the scheme owner when this
    /// installation could not be added to its proxies.
    #[must_use]
    pub fn unjoined_owner(&self) -> Option<&Utf8Path> {
        self.unjoined_owner.as_deref()
    }

    /// Consumes the outcome, returning the registry to dispatch with.
    #[must_use]
    pub fn into_registry(self) -> Option<HandlerRegistry<S, C>> {
        self.registry
    }
}

/// Decides at startup which registry serves this run and whether this
/// installation takes over the scheme.
///
/// The OS association is always written before any registry change, so a
/// denied write commits nothing. Nothing is ever rolled back.
pub struct RegistrationReconciler<A, P, S, C>
where
    A: SchemeAssociation,
    P: ConsentPrompt + ?Sized,
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    identity: InstallationIdentity,
    binding: OsBinding<A>,
    prompt: Arc<P>,
    store: Arc<S>,
    clock: Arc<C>,
}

impl<A, P, S, C> RegistrationReconciler<A, P, S, C>
where
    A: SchemeAssociation,
    P: ConsentPrompt + ?Sized,
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    /// Creates a reconciler for the installation described by `identity`.
    #[must_use]
    pub const fn new(
        identity: InstallationIdentity,
        binding: OsBinding<A>,
        prompt: Arc<P>,
        store: Arc<S>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            identity,
            binding,
            prompt,
            store,
            clock,
        }
    }

    /// Returns the identity of this installation.
    #[must_use]
    pub const fn identity(&self) -> &InstallationIdentity {
        &self.identity
    }

    /// Classifies the current scheme owner without changing anything.
    ///
    /// An unreadable association is reported as
    /// [`OwnershipState::Undetermined`].
    #[must_use]
    pub fn observe(&self) -> OwnershipState {
        match self.binding.current_owner() {
            Ok(owner) => OwnershipState::classify(owner.as_deref(), &self.identity, Utf8Path::exists),
            Err(err) => {
                warn!(
                    scheme = self.binding.scheme(),
                    error = %err,
                    "scheme association unreadable"
                );
                OwnershipState::Undetermined { owner: None }
            }
        }
    }

    /// Reconciles scheme ownership and returns the registry for this run.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Association`] when the OS refuses an
    /// accepted ownership change, or [`ReconcileError::Registry`] when a
    /// registry of this installation cannot be written.
    pub fn reconcile(
        &self,
        directive: ReconcileDirective,
    ) -> Result<ReconcileOutcome<S, C>, ReconcileError> {
        let local = self.open_registry(self.identity.install_dir().to_owned());
        let state = self.observe();
        info!(
            scheme = self.binding.scheme(),
            state = %state,
            owner = state.owner().map(Utf8Path::as_str),
            forced = directive.force_registration(),
            "reconciling scheme ownership"
        );

        match &state {
            OwnershipState::OwnedBySelf => Ok(ReconcileOutcome::active(state, local, false)),
            OwnershipState::OwnedByOtherValid { owner } => {
                let owner_path = owner.clone();
                self.delegate(state, &owner_path, local, directive)
            }
            OwnershipState::Unregistered
            | OwnershipState::OwnedByOtherStale { .. }
            | OwnershipState::Undetermined { .. } => self.claim(state, local, directive),
        }
    }

    fn claim(
        &self,
        state: OwnershipState,
        mut local: HandlerRegistry<S, C>,
        directive: ReconcileDirective,
    ) -> Result<ReconcileOutcome<S, C>, ReconcileError> {
        let suppressed = local.no_register() || directive.suppress_prompts();
        if suppressed && !directive.force_registration() {
            debug!("registration prompt suppressed; staying passive");
            return Ok(ReconcileOutcome::passive(state));
        }

        let question = ConsentQuestion::ClaimScheme {
            scheme: self.binding.scheme().to_owned(),
            previous_owner: state.owner().map(Utf8Path::to_path_buf),
        };
        match self.prompt.ask(&question) {
            ConsentAnswer::Yes => {
                self.binding.set_owner(self.identity.executable())?;
                if let OwnershipState::Undetermined {
                    owner: Some(foreign),
                } = &state
                {
                    local.register(&HandlerTarget::Default, foreign, false)?;
                }
                local.persist()?;
                Ok(ReconcileOutcome::active(state, local, true))
            }
            ConsentAnswer::NeverAsk => {
                local.set_no_register(true)?;
                info!("registration declined; will not ask again");
                Ok(ReconcileOutcome::passive(state))
            }
            ConsentAnswer::No => {
                info!("registration declined");
                Ok(ReconcileOutcome::passive(state))
            }
        }
    }

    fn delegate(
        &self,
        state: OwnershipState,
        owner: &Utf8Path,
        local: HandlerRegistry<S, C>,
        directive: ReconcileDirective,
    ) -> Result<ReconcileOutcome<S, C>, ReconcileError> {
        let Some(owner_dir) = state.owner_install_dir() else {
            return self.claim(state, local, directive);
        };

        let mut ownership_changed = false;
        if directive.force_registration() {
            let question = ConsentQuestion::ReplaceOwner {
                scheme: self.binding.scheme().to_owned(),
                current_owner: owner.to_owned(),
            };
            if self.prompt.ask(&question) == ConsentAnswer::Yes {
                self.binding.set_owner(self.identity.executable())?;
                ownership_changed = true;
            }
        }

        let mut owner_registry = self.open_registry(owner_dir.clone());
        let unjoined_owner = match owner_registry.register_proxy(self.identity.install_dir()) {
            Ok(_) => None,
            Err(err) => {
                warn!(
                    %owner_dir,
                    error = %err,
                    "could not register this installation with the scheme owner"
                );
                Some(owner_dir.clone())
            }
        };

        if ownership_changed {
            let mut registry = local;
            registry.register_proxy(&owner_dir)?;
            return Ok(ReconcileOutcome::active(state, registry, true)
                .with_unjoined_owner(unjoined_owner));
        }
        Ok(ReconcileOutcome::active(state, owner_registry, false)
            .with_unjoined_owner(unjoined_owner))
    }

    fn open_registry(&self, install_dir: Utf8PathBuf) -> HandlerRegistry<S, C> {
        HandlerRegistry::open(install_dir, Arc::clone(&self.store), Arc::clone(&self.clock))
    }
}
