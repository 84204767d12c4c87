//! Shared world state for dispatch delegation BDD scenarios.

use std::sync::Arc;

use linkhandler::routing::{
    adapters::memory::{InMemoryRegistryStore, RecordingLauncher},
    services::{DispatchError, DispatchOutcome, Dispatcher, HandlerRegistry},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Registry type used by the BDD world.
pub type TestRegistry = HandlerRegistry<InMemoryRegistryStore, DefaultClock>;

/// Scenario world for dispatch delegation behaviour tests.
pub struct DispatchWorld {
    /// Registries of every installation in the scenario.
    pub store: Arc<InMemoryRegistryStore>,
    /// Records launched handlers instead of spawning them.
    pub launcher: Arc<RecordingLauncher>,
    /// Dispatcher under test.
    pub dispatcher: Dispatcher<InMemoryRegistryStore, RecordingLauncher>,
    /// Result of the last dispatch.
    pub last_dispatch: Option<Result<DispatchOutcome, DispatchError>>,
}

impl DispatchWorld {
    /// Creates a world with no registries.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryRegistryStore::new());
        let launcher = Arc::new(RecordingLauncher::new());
        let dispatcher = Dispatcher::new("nxm", Arc::clone(&store), Arc::clone(&launcher));
        Self {
            store,
            launcher,
            dispatcher,
            last_dispatch: None,
        }
    }

    /// Opens the registry of `install_dir`.
    #[must_use]
    pub fn registry(&self, install_dir: &str) -> TestRegistry {
        HandlerRegistry::open(install_dir, Arc::clone(&self.store), Arc::new(DefaultClock))
    }

    /// Returns the last dispatch result.
    ///
    /// # Errors
    ///
    /// Returns an error when no dispatch has run yet.
    pub fn last_dispatch(&self) -> Result<&Result<DispatchOutcome, DispatchError>, eyre::Report> {
        self.last_dispatch
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no dispatch recorded in scenario world"))
    }

    /// Returns the last successful dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error when the last dispatch is missing or failed.
    pub fn dispatched(&self) -> Result<&DispatchOutcome, eyre::Report> {
        match self.last_dispatch()? {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(eyre::eyre!("expected a dispatched link, got error: {err}")),
        }
    }
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DispatchWorld {
    DispatchWorld::default()
}
