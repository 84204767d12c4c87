//! Consent questions and answers.

use camino::Utf8PathBuf;
use std::fmt;

/// A question put to the user before the scheme association changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentQuestion {
    /// Associate this installation with a scheme nobody usable owns.
    ClaimScheme {
        /// Scheme being claimed.
        scheme: String,
        /// Executable that was associated before, if any.
        previous_owner: Option<Utf8PathBuf>,
    },
    /// Replace a working installation that currently owns the scheme.
    ReplaceOwner {
        /// Scheme being claimed.
        scheme: String,
        /// Executable that owns the scheme now.
        current_owner: Utf8PathBuf,
    },
}

impl ConsentQuestion {
    /// Returns the dialog title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ClaimScheme { .. } => "Register?",
            Self::ReplaceOwner { .. } => "Change handler?",
        }
    }

    /// Returns whether "never ask again" is a valid answer.
    #[must_use]
    pub const fn offers_never_ask(&self) -> bool {
        matches!(self, Self::ClaimScheme { .. })
    }
}

impl fmt::Display for ConsentQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClaimScheme {
                scheme,
                previous_owner: None,
            } => write!(
                f,
                "This installation is not set up to handle {scheme}:// links. \
                 Associate it with {scheme}:// links?"
            ),
            Self::ClaimScheme {
                scheme,
                previous_owner: Some(owner),
            } => write!(
                f,
                "{scheme}:// links are currently associated with {owner}. \
                 Associate this installation with {scheme}:// links instead?"
            ),
            Self::ReplaceOwner {
                scheme,
                current_owner,
            } => write!(
                f,
                "A {scheme}:// handler from a different installation ({current_owner}) is \
                 registered. Do you want to replace it? This is usually not necessary \
                 unless the other installation is defective."
            ),
        }
    }
}

/// Answer to a [`ConsentQuestion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentAnswer {
    /// Go ahead.
    Yes,
    /// Not now.
    No,
    /// Not now, and stop asking on later runs.
    NeverAsk,
}
