//! Interactive read loop
//!
//! [`drive`] feeds a [`Shell`] lines from any [`LineSource`] until `exit`,
//! `quit`, or end of input. [`run`] plugs in a rustyline editor.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, History};
use rustyline::Editor;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cli::adapters::Prompter;
use crate::cli::error::CliResult;
use crate::cli::helper::PbxHelper;
use crate::cli::shell::{Flow, Shell};
use crate::config::ConfigurationLoader;
use crate::observability::Logger;
use crate::session::SessionConfig;

/// One read at the command prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line as typed
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D or a closed stream
    Eof,
}

/// Where the read loop gets command lines from. Follow-up questions go
/// through the [`Prompter`] half.
pub trait LineSource: Prompter {
    /// Read the next command line
    fn next_line(&mut self, prompt: &str) -> CliResult<Input>;

    /// Called before every read with the current session mapping
    fn observe(&mut self, _config: &SessionConfig) {}
}

impl<I: History> LineSource for Editor<PbxHelper, I> {
    fn next_line(&mut self, prompt: &str) -> CliResult<Input> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.as_str());
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn observe(&mut self, config: &SessionConfig) {
        if let Some(helper) = self.helper_mut() {
            helper.sync(config);
        }
    }
}

/// Read and execute lines until the operator leaves. Ctrl-C at the prompt is
/// ignored; end of input runs `exit`. Returns why the loop ended.
pub fn drive<S: LineSource>(shell: &mut Shell, input: &mut S) -> &'static str {
    let prompt = shell.settings().prompt.clone();

    loop {
        input.observe(shell.session().config());

        match input.next_line(&prompt) {
            Ok(Input::Line(line)) => {
                if shell.execute_line(&line, &mut *input) == Flow::Exit {
                    return "exit";
                }
            }
            Ok(Input::Interrupted) => {
                debug!("interrupt at prompt ignored");
            }
            Ok(Input::Eof) => {
                shell.execute_line("exit", &mut *input);
                return "end of input";
            }
            Err(e) => {
                warn!(error = %e, "line editor failed");
                shell.console().error(&format!("Input error: {}", e));
                return "input error";
            }
        }
    }
}

/// Run the shell with the given configuration until the operator leaves.
pub fn run(loader: &ConfigurationLoader) -> Result<()> {
    let registry = Arc::new(loader.registry()?);
    let mut shell = Shell::from_loader(loader, Arc::clone(&registry));

    if let Some(path) = loader.log_file() {
        let logger = Logger::new(Some(&path), Some(&loader.config.logging.log_level))?;
        shell = shell.with_logger(logger);
    }

    let mut rl: Editor<PbxHelper, DefaultHistory> =
        Editor::new().context("Failed to initialise line editor")?;
    rl.set_helper(Some(PbxHelper::new(registry)));

    shell.start();
    let reason = drive(&mut shell, &mut rl);
    shell.finish(reason);
    Ok(())
}
