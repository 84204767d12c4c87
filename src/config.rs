//! Runtime configuration read from the process environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `LINKHANDLER_SCHEME` | URL scheme to claim and dispatch | `nxm` |
//! | `LINKHANDLER_NO_REGISTER` | `1`, `true` or `yes` suppresses claim prompts | unset |
//! | `LINKHANDLER_APPLICATIONS_DIR` | desktop-entry directory (Unix) | `<data dir>/applications` |

use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use thiserror::Error;

/// Scheme claimed when none is configured.
pub const DEFAULT_SCHEME: &str = "nxm";

/// Environment variable overriding the scheme.
pub const SCHEME_ENV: &str = "LINKHANDLER_SCHEME";

/// Environment variable that suppresses claim prompts.
pub const NO_REGISTER_ENV: &str = "LINKHANDLER_NO_REGISTER";

/// Environment variable overriding the desktop-entry directory.
pub const APPLICATIONS_DIR_ENV: &str = "LINKHANDLER_APPLICATIONS_DIR";

/// Errors raised while assembling configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The running executable could not be located.
    #[error("cannot locate the running executable: {0}")]
    CurrentExecutable(String),

    /// The executable path is not valid UTF-8.
    #[error("executable path {0} is not valid UTF-8")]
    NonUtf8Path(String),

    /// The configured scheme violates `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
    #[error("invalid URL scheme '{0}'")]
    InvalidScheme(String),

    /// No platform data directory exists and none was configured.
    #[error("no applications directory; set {APPLICATIONS_DIR_ENV}")]
    MissingApplicationsDir,
}

/// Settings for one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    scheme: String,
    executable: Utf8PathBuf,
    suppress_prompts: bool,
    applications_dir: Option<Utf8PathBuf>,
}

impl HandlerConfig {
    /// Reads configuration for the running executable from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the executable cannot be located or a
    /// configured value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let current = env::current_exe()
            .map_err(|err| ConfigError::CurrentExecutable(err.to_string()))?;
        let executable = Utf8PathBuf::from_path_buf(current)
            .map_err(|path| ConfigError::NonUtf8Path(path.display().to_string()))?;
        Self::from_lookup(executable, |key| env::var(key).ok())
    }

    /// Builds configuration for `executable` from `lookup`, which returns
    /// the value of an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidScheme`] for a malformed scheme.
    pub fn from_lookup(
        executable: impl Into<Utf8PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let scheme = lookup(SCHEME_ENV)
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_owned());
        if !is_valid_scheme(&scheme) {
            return Err(ConfigError::InvalidScheme(scheme));
        }

        let suppress_prompts = lookup(NO_REGISTER_ENV).is_some_and(|value| is_truthy(&value));

        let applications_dir = lookup(APPLICATIONS_DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from)
            .or_else(default_applications_dir);

        Ok(Self {
            scheme,
            executable: executable.into(),
            suppress_prompts,
            applications_dir,
        })
    }

    /// Returns the scheme to claim and dispatch.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the running executable.
    #[must_use]
    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }

    /// Returns whether the environment suppresses claim prompts.
    #[must_use]
    pub const fn suppress_prompts(&self) -> bool {
        self.suppress_prompts
    }

    /// Returns the desktop-entry directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApplicationsDir`] when neither the
    /// environment nor the platform supplies one.
    pub fn applications_dir(&self) -> Result<&Utf8Path, ConfigError> {
        self.applications_dir
            .as_deref()
            .ok_or(ConfigError::MissingApplicationsDir)
    }
}

fn default_applications_dir() -> Option<Utf8PathBuf> {
    let data_dir = Utf8PathBuf::from_path_buf(dirs::data_dir()?).ok()?;
    Some(data_dir.join("applications"))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut characters = scheme.chars();
    characters
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && characters.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
