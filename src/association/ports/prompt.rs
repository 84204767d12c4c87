//! Consent port.

use crate::association::domain::{ConsentAnswer, ConsentQuestion};

/// Asks the user before the scheme association changes.
///
/// Implementations that cannot reach a user must answer
/// [`ConsentAnswer::No`]. [`ConsentAnswer::NeverAsk`] is only meaningful
/// when [`ConsentQuestion::offers_never_ask`] holds; callers treat it as
/// `No` otherwise.
pub trait ConsentPrompt {
    /// Puts `question` to the user and returns the answer.
    fn ask(&self, question: &ConsentQuestion) -> ConsentAnswer;
}
