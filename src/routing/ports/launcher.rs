//! Process launch port for resolved handlers.

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Result type for handler launches.
pub type LaunchResult<T> = Result<T, LaunchError>;

/// A handler invocation: one executable, one argument, and the directory it
/// runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    executable: Utf8PathBuf,
    argument: String,
    working_dir: Utf8PathBuf,
}

impl LaunchRequest {
    /// Creates a request that runs `executable` from its own directory.
    #[must_use]
    pub fn new(executable: impl Into<Utf8PathBuf>, argument: impl Into<String>) -> Self {
        let executable_path = executable.into();
        let working_dir = executable_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
        Self {
            executable: executable_path,
            argument: argument.into(),
            working_dir,
        }
    }

    /// Returns the executable to run.
    #[must_use]
    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }

    /// Returns the sole argument passed to the executable.
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Returns the working directory of the new process.
    #[must_use]
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }
}

/// Fire-and-forget launch contract: start the process and return without
/// waiting for it or capturing its output.
pub trait ProcessLauncher: Send + Sync {
    /// Starts the process described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the process cannot be started.
    fn launch(&self, request: &LaunchRequest) -> LaunchResult<()>;
}

/// Errors returned by process launcher adapters.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The handler executable is not present on disk.
    #[error("handler executable {0} does not exist")]
    MissingExecutable(Utf8PathBuf),

    /// The OS refused to start the process.
    #[error("failed to launch handler {executable}: {reason}")]
    Spawn {
        /// Executable that failed to start.
        executable: Utf8PathBuf,
        /// Underlying OS error.
        reason: Arc<std::io::Error>,
    },
}

impl LaunchError {
    /// Wraps an OS error raised while starting `executable`.
    pub fn spawn(executable: &Utf8Path, err: std::io::Error) -> Self {
        Self::Spawn {
            executable: executable.to_owned(),
            reason: Arc::new(err),
        }
    }
}
