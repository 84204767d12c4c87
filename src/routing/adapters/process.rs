//! Launcher that starts handlers as detached OS processes.

use crate::routing::ports::{LaunchError, LaunchRequest, LaunchResult, ProcessLauncher};
use std::process::{Command, Stdio};
use tracing::info;

/// Starts handler executables without waiting for them.
///
/// Standard streams are detached so the handler never blocks on, or writes
/// into, the dispatching process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnLauncher;

impl SpawnLauncher {
    /// Creates a spawning launcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for SpawnLauncher {
    fn launch(&self, request: &LaunchRequest) -> LaunchResult<()> {
        if !request.executable().is_file() {
            return Err(LaunchError::MissingExecutable(
                request.executable().to_owned(),
            ));
        }

        let child = Command::new(request.executable())
            .arg(request.argument())
            .current_dir(request.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| LaunchError::spawn(request.executable(), err))?;

        info!(
            executable = %request.executable(),
            pid = child.id(),
            "launched link handler"
        );
        Ok(())
    }
}
