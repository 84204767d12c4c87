//! Consent prompt with a preset answer.

use crate::association::{
    domain::{ConsentAnswer, ConsentQuestion},
    ports::ConsentPrompt,
};

/// Prompt that answers every question the same way without asking anyone.
///
/// Used for `--yes` runs, runs without a terminal, and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConsent(ConsentAnswer);

impl FixedConsent {
    /// Creates a prompt that always answers `answer`.
    #[must_use]
    pub const fn new(answer: ConsentAnswer) -> Self {
        Self(answer)
    }

    /// Returns the preset answer.
    #[must_use]
    pub const fn answer(&self) -> ConsentAnswer {
        self.0
    }
}

impl ConsentPrompt for FixedConsent {
    fn ask(&self, question: &ConsentQuestion) -> ConsentAnswer {
        match self.0 {
            ConsentAnswer::NeverAsk if !question.offers_never_ask() => ConsentAnswer::No,
            answer => answer,
        }
    }
}
