//! Prompter adapter trait

use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::{Editor, Helper};

use crate::cli::error::CliResult;
use crate::error::PbxError;

/// Answers accepted by yes/no confirmations
const AFFIRMATIVE: &[&str] = &["y", "yes"];

/// True for `y` / `yes` in any case, ignoring surrounding whitespace.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Reads a line of operator input for confirmations and wizard questions
pub trait Prompter {
    /// Read one line. `None` means the operator interrupted the prompt.
    fn read_line(&mut self, prompt: &str) -> CliResult<Option<String>>;

    /// Ask a question that must be answered; an interrupt becomes
    /// [`PbxError::UserAbort`].
    fn ask(&mut self, prompt: &str) -> CliResult<String> {
        match self.read_line(prompt)? {
            Some(answer) => Ok(answer),
            None => Err(PbxError::UserAbort.into()),
        }
    }

    /// Yes/no confirmation. Only `y`/`yes` confirm; when `default_yes` is set
    /// an empty answer confirms too.
    fn confirm(&mut self, prompt: &str, default_yes: bool) -> CliResult<bool> {
        let answer = self.ask(prompt)?;
        Ok(is_affirmative(&answer) || (default_yes && answer.trim().is_empty()))
    }
}

impl<H: Helper, I: History> Prompter for Editor<H, I> {
    fn read_line(&mut self, prompt: &str) -> CliResult<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
