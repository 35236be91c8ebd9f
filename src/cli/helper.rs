//! rustyline helper: context-aware completion and command hints.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::cli::dispatcher;
use crate::completion::CompletionContext;
use crate::profile::ProfileRegistry;
use crate::session::SessionConfig;

/// Line-editor helper. Holds a copy of the session mapping, refreshed with
/// [`PbxHelper::sync`] before every prompt.
pub struct PbxHelper {
    registry: Arc<ProfileRegistry>,
    session: SessionConfig,
    commands: Vec<&'static str>,
}

impl PbxHelper {
    /// Helper over `registry` with an empty session
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self {
            registry,
            session: SessionConfig::new(),
            commands: dispatcher::command_names(),
        }
    }

    /// Pick up the latest session mapping
    pub fn sync(&mut self, session: &SessionConfig) {
        if &self.session != session {
            self.session = session.clone();
        }
    }

    /// Start offset and candidates for the word under `pos`
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let context = CompletionContext::new(&self.registry, &self.session, &self.commands);
        let completion = context.complete(line, pos);
        let pairs = completion
            .candidates
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        (completion.start, pairs)
    }

    /// Rest of the command name being typed, if it is unambiguous so far
    pub fn command_hint(&self, line: &str, pos: usize) -> Option<String> {
        let line = line.get(..pos)?;
        if line.is_empty() || line.contains(char::is_whitespace) {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Helper for PbxHelper {}

impl Completer for PbxHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for PbxHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.command_hint(line, pos)
    }
}

impl Highlighter for PbxHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Borrowed(line)
    }
}

impl Validator for PbxHelper {}
