//! Consent prompt on a text terminal.

use crate::association::{
    domain::{ConsentAnswer, ConsentQuestion},
    ports::ConsentPrompt,
};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Asks consent questions on a line-oriented terminal.
///
/// `y`/`yes` accepts, `s`/`never` declines and stops later prompts (where
/// offered); anything else, including end of input, declines.
pub struct TerminalPrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    input: RefCell<R>,
    output: RefCell<W>,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Creates a prompt reading stdin and writing to stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R, W> TerminalPrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Creates a prompt over arbitrary streams.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    fn write_question(&self, question: &ConsentQuestion) -> io::Result<()> {
        let mut output = self.output.borrow_mut();
        writeln!(output, "{}", question.title())?;
        writeln!(output, "{question}")?;
        if question.offers_never_ask() {
            write!(output, "[y]es / [n]o / [s]top asking: ")?;
        } else {
            write!(output, "[y]es / [n]o: ")?;
        }
        output.flush()
    }

    fn read_answer(&self) -> io::Result<String> {
        let mut line = String::new();
        self.input.borrow_mut().read_line(&mut line)?;
        Ok(line.trim().to_ascii_lowercase())
    }
}

impl<R, W> ConsentPrompt for TerminalPrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    fn ask(&self, question: &ConsentQuestion) -> ConsentAnswer {
        let answer = self
            .write_question(question)
            .and_then(|()| self.read_answer());
        match answer.as_deref() {
            Ok("y" | "yes") => ConsentAnswer::Yes,
            Ok("s" | "stop" | "never") if question.offers_never_ask() => ConsentAnswer::NeverAsk,
            Ok(_) => ConsentAnswer::No,
            Err(err) => {
                warn!(error = %err, "consent prompt failed; treating as no");
                ConsentAnswer::No
            }
        }
    }
}
