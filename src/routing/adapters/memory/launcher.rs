//! Launcher that records requests instead of starting processes.

use crate::routing::ports::{LaunchError, LaunchRequest, LaunchResult, ProcessLauncher};
use camino::Utf8Path;
use std::sync::{Arc, RwLock};

/// Process launcher that records every request it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    launches: Arc<RwLock<Vec<LaunchRequest>>>,
}

impl RecordingLauncher {
    /// Creates a launcher with no recorded launches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded launches in order.
    ///
    /// # Errors
    ///
    /// Returns a spawn error when lock acquisition fails.
    pub fn launches(&self) -> LaunchResult<Vec<LaunchRequest>> {
        let launches = self.launches.read().map_err(|err| {
            LaunchError::spawn(
                Utf8Path::new("recording-launcher"),
                std::io::Error::other(err.to_string()),
            )
        })?;
        Ok(launches.clone())
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, request: &LaunchRequest) -> LaunchResult<()> {
        let mut launches = self.launches.write().map_err(|err| {
            LaunchError::spawn(request.executable(), std::io::Error::other(err.to_string()))
        })?;
        launches.push(request.clone());
        Ok(())
    }
}
