//! One handler invocation: reconcile scheme ownership, then act.

use crate::association::{
    domain::OwnershipState,
    ports::{ConsentPrompt, SchemeAssociation},
    services::{ReconcileDirective, ReconcileError, ReconcileOutcome, RegistrationReconciler},
};
use crate::routing::{
    domain::{HandlerTable, HandlerTarget, RegistrationOutcome},
    ports::{ProcessLauncher, RegistryStore},
    services::{DispatchError, DispatchOutcome, Dispatcher, HandlerRegistry, HandlerRegistryError},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use thiserror::Error;
use tracing::info;

/// What the user asked this run to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Launch the handler for a link.
    Dispatch {
        /// Link as received.
        link: String,
    },
    /// Point targets at a handler executable.
    Register {
        /// Categories, or the default handler.
        targets: Vec<HandlerTarget>,
        /// Handler executable.
        handler: Utf8PathBuf,
        /// Claim the scheme even when suppressed or owned elsewhere.
        force: bool,
    },
    /// Clear targets.
    Unregister {
        /// Categories, or the default handler.
        targets: Vec<HandlerTarget>,
    },
    /// Stop consulting a proxy installation.
    RemoveProxy {
        /// Installation directory of the proxy.
        install_dir: Utf8PathBuf,
    },
    /// Print the active registry.
    Show,
}

impl Invocation {
    const fn forces_registration(&self) -> bool {
        matches!(self, Self::Register { force: true, .. })
    }
}

/// Snapshot of the registry that served a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryListing {
    /// Installation owning the registry.
    pub install_dir: Utf8PathBuf,
    /// Ownership state observed at startup.
    pub state: OwnershipState,
    /// Registry contents.
    pub table: HandlerTable,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    /// No registry is active; nothing was done.
    Passive {
        /// Ownership state observed at startup.
        state: OwnershipState,
    },
    /// A handler was launched.
    Dispatched(DispatchOutcome),
    /// Targets were registered.
    Registered {
        /// Installation whose registry changed.
        install_dir: Utf8PathBuf,
        /// Outcome per requested target.
        outcomes: Vec<(HandlerTarget, RegistrationOutcome)>,
    },
    /// Targets were cleared.
    Unregistered {
        /// Installation whose registry changed.
        install_dir: Utf8PathBuf,
        /// Targets that held a handler.
        removed: Vec<HandlerTarget>,
    },
    /// A proxy was removed, or was not registered.
    ProxyRemoved {
        /// Installation whose registry changed.
        install_dir: Utf8PathBuf,
        /// Whether the proxy was registered.
        removed: bool,
    },
    /// The active registry.
    Listing(RegistryListing),
}

/// Something the operator should know about a run that still succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunNotice {
    /// This installation could not be added to the scheme owner's proxies,
    /// so the owner will not fall back to it.
    OwnerNotJoined {
        /// Installation directory of the scheme owner.
        owner_dir: Utf8PathBuf,
    },
}

/// Outcome of a run together with its notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// What the run did.
    pub outcome: AppOutcome,
    /// Conditions worth reporting alongside the outcome.
    pub notices: Vec<RunNotice>,
}

/// Errors that end a run with a failure exit status.
#[derive(Debug, Error)]
pub enum AppError {
    /// Startup reconciliation failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The link could not be dispatched.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A registry change could not be persisted.
    #[error(transparent)]
    Registry(#[from] HandlerRegistryError),
}

/// Wires reconciliation and dispatch for one invocation.
pub struct LinkHandlerApp<A, P, S, L, C>
where
    A: SchemeAssociation,
    P: ConsentPrompt + ?Sized,
    S: RegistryStore,
    L: ProcessLauncher,
    C: Clock + Send + Sync,
{
    reconciler: RegistrationReconciler<A, P, S, C>,
    dispatcher: Dispatcher<S, L>,
    suppress_prompts: bool,
}

impl<A, P, S, L, C> LinkHandlerApp<A, P, S, L, C>
where
    A: SchemeAssociation,
    P: ConsentPrompt + ?Sized,
    S: RegistryStore,
    L: ProcessLauncher,
    C: Clock + Send + Sync,
{
    /// Creates an app. `suppress_prompts` carries the environment's
    /// "don't ask again" override.
    #[must_use]
    pub const fn new(
        reconciler: RegistrationReconciler<A, P, S, C>,
        dispatcher: Dispatcher<S, L>,
        suppress_prompts: bool,
    ) -> Self {
        Self {
            reconciler,
            dispatcher,
            suppress_prompts,
        }
    }

    /// Runs `invocation`.
    ///
    /// Reconciliation always runs first. When it leaves the run passive the
    /// invocation is dropped and [`AppOutcome::Passive`] is returned. A
    /// failure to join the scheme owner's proxies does not fail the run; it
    /// is reported as a [`RunNotice`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when reconciliation, dispatch, or a registry
    /// write fails.
    pub fn run(&self, invocation: &Invocation) -> Result<RunReport, AppError> {
        let directive = ReconcileDirective::new()
            .with_force_registration(invocation.forces_registration())
            .with_suppressed_prompts(self.suppress_prompts);
        let reconciled = self.reconciler.reconcile(directive)?;
        let notices = reconciled
            .unjoined_owner()
            .map(|owner_dir| RunNotice::OwnerNotJoined {
                owner_dir: owner_dir.to_owned(),
            })
            .into_iter()
            .collect();
        let outcome = self.act(invocation, reconciled)?;
        Ok(RunReport { outcome, notices })
    }

    fn act(
        &self,
        invocation: &Invocation,
        reconciled: ReconcileOutcome<S, C>,
    ) -> Result<AppOutcome, AppError> {
        let state = reconciled.state().clone();
        let Some(mut registry) = reconciled.into_registry() else {
            info!(state = %state, "no active handler registry; nothing to do");
            return Ok(AppOutcome::Passive { state });
        };

        match invocation {
            Invocation::Dispatch { link } => {
                let dispatched = self.dispatcher.dispatch(link, &registry)?;
                Ok(AppOutcome::Dispatched(dispatched))
            }
            Invocation::Register {
                targets, handler, ..
            } => {
                let outcomes = registry.register_all(targets, handler, true)?;
                Ok(AppOutcome::Registered {
                    install_dir: registry.install_dir().to_owned(),
                    outcomes,
                })
            }
            Invocation::Unregister { targets } => {
                let removed = unregister_all(&mut registry, targets)?;
                Ok(AppOutcome::Unregistered {
                    install_dir: registry.install_dir().to_owned(),
                    removed,
                })
            }
            Invocation::RemoveProxy { install_dir } => {
                let removed = registry.unregister_proxy(install_dir)?;
                Ok(AppOutcome::ProxyRemoved {
                    install_dir: registry.install_dir().to_owned(),
                    removed,
                })
            }
            Invocation::Show => Ok(AppOutcome::Listing(RegistryListing {
                install_dir: registry.install_dir().to_owned(),
                state,
                table: registry.table().clone(),
            })),
        }
    }

    /// Returns the installation directory of this executable.
    #[must_use]
    pub fn install_dir(&self) -> &Utf8Path {
        self.reconciler.identity().install_dir()
    }
}

fn unregister_all<S, C>(
    registry: &mut HandlerRegistry<S, C>,
    targets: &[HandlerTarget],
) -> Result<Vec<HandlerTarget>, HandlerRegistryError>
where
    S: RegistryStore,
    C: Clock + Send + Sync,
{
    let mut removed = Vec::new();
    for target in targets {
        if registry.unregister(target)? {
            removed.push(target.clone());
        }
    }
    Ok(removed)
}
