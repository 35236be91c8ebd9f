//! The interactive shell.
//!
//! A [`Shell`] owns the session for one run together with the stores and
//! adapters its commands use. It never reads input itself: the caller feeds
//! it lines through [`Shell::execute_line`] along with a [`Prompter`] for any
//! follow-up questions.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::cli::adapters::{Console, ManifestRenderer, Prompter, Renderer, TerminalConsole};
use crate::cli::dispatcher;
use crate::cli::error::CliError;
use crate::config::{ConfigurationLoader, ShellConfiguration};
use crate::error::ErrorKind;
use crate::history::{EntryStatus, HistoryStore};
use crate::observability::Logger;
use crate::profile::ProfileRegistry;
use crate::session::Session;
use crate::storage::SavedConfigStore;

/// What the read loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the shell
    Exit,
}

/// Presentation and behaviour knobs taken from the configuration file
#[derive(Debug, Clone)]
pub struct ShellSettings {
    /// Command prompt
    pub prompt: String,
    /// Start-up banner
    pub intro: String,
    /// When false, builds and exits append nothing to history
    pub history_enabled: bool,
    /// Entries shown by a bare `history`
    pub default_tail: usize,
    /// Base for relative `output_path` values
    pub output_dir: PathBuf,
    /// Root searched by `scan`
    pub scan_root: PathBuf,
}

impl ShellSettings {
    /// Settings from a loaded configuration, paths expanded
    pub fn from_loader(loader: &ConfigurationLoader) -> Self {
        let config = &loader.config;
        Self {
            prompt: config.shell.prompt.clone(),
            intro: config.shell.intro.clone(),
            history_enabled: config.history.enabled,
            default_tail: config.history.default_tail,
            output_dir: loader.output_dir(),
            scan_root: loader.scan_root(),
        }
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self::from_loader(&ConfigurationLoader::from_config(ShellConfiguration::default()))
    }
}

/// One shell run
pub struct Shell {
    pub(crate) registry: Arc<ProfileRegistry>,
    pub(crate) session: Session,
    pub(crate) history: HistoryStore,
    pub(crate) saved: SavedConfigStore,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) console: Box<dyn Console>,
    pub(crate) logger: Option<Logger>,
    pub(crate) settings: ShellSettings,
}

impl Shell {
    /// Shell with a terminal console and the manifest renderer
    pub fn new(
        registry: Arc<ProfileRegistry>,
        history: HistoryStore,
        saved: SavedConfigStore,
        settings: ShellSettings,
    ) -> Self {
        Self {
            registry,
            session: Session::new(),
            history,
            saved,
            renderer: Box::new(ManifestRenderer),
            console: Box::new(TerminalConsole),
            logger: None,
            settings,
        }
    }

    /// Shell wired to the paths of a loaded configuration
    pub fn from_loader(loader: &ConfigurationLoader, registry: Arc<ProfileRegistry>) -> Self {
        Self::new(
            registry,
            HistoryStore::new(loader.history_path()),
            SavedConfigStore::new(loader.configs_dir()),
            ShellSettings::from_loader(loader),
        )
    }

    /// Send output to `console` instead of the terminal
    pub fn with_console(mut self, console: impl Console + 'static) -> Self {
        self.console = Box::new(console);
        self
    }

    /// Render builds with `renderer`
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Write a markdown transcript through `logger`
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Profiles this shell validates against
    pub fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.registry
    }

    /// Current session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// History log
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Active settings
    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// Output adapter
    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    /// Print the banner and open the transcript
    pub fn start(&self) {
        self.console.print(&self.settings.intro);
        let profiles = self.registry.list_profiles();
        self.transcript(|log| log.log_session_start(self.history.path(), &profiles));
    }

    /// Close the transcript
    pub fn finish(&self, reason: &str) {
        self.transcript(|log| log.log_session_end(reason));
    }

    /// Run one input line. Errors are reported on the console; only `exit`
    /// and `quit` return [`Flow::Exit`].
    pub fn execute_line(&mut self, line: &str, prompter: &mut dyn Prompter) -> Flow {
        let Some((name, args)) = split_command(line) else {
            return Flow::Continue;
        };

        match dispatcher::dispatch(self, prompter, name, args) {
            Ok(flow) => {
                self.transcript(|log| log.log_command(line.trim(), "ok"));
                flow
            }
            Err(err) => {
                self.report(&err);
                let outcome = err.to_string();
                self.transcript(|log| log.log_command(line.trim(), &outcome));
                Flow::Continue
            }
        }
    }

    /// Show an error the way the operator should see it
    pub(crate) fn report(&self, err: &CliError) {
        if err.is_abort() {
            self.console.warn("Cancelled.");
            return;
        }
        if let CliError::Core(core) = err {
            if core.kind() == ErrorKind::Persistence {
                warn!(error = %core, recoverable = core.is_recoverable(), "persistence failure");
            }
        }
        self.console.error(&err.to_string());
    }

    /// Append the current session to history and mark it recorded.
    ///
    /// A failed append is reported and otherwise ignored.
    pub(crate) fn record(&mut self, status: EntryStatus) -> Option<u32> {
        self.session.mark_recorded();
        if !self.settings.history_enabled {
            return None;
        }
        match self.history.append(self.session.config(), status) {
            Ok(serial) => Some(serial),
            Err(e) => {
                warn!(error = %e, "history append failed");
                self.console
                    .warn(&format!("Could not record history: {}", e));
                let message = e.to_string();
                self.transcript(|log| log.log_error(&message, Some("history append")));
                None
            }
        }
    }

    pub(crate) fn transcript<F>(&self, write: F)
    where
        F: FnOnce(&Logger) -> anyhow::Result<()>,
    {
        if let Some(logger) = &self.logger {
            if let Err(e) = write(logger) {
                warn!(error = %e, "transcript write failed");
            }
        }
    }
}

/// Split a line into its command word and the remaining argument text.
///
/// Returns `None` for blank lines.
pub fn split_command(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(idx) => Some((&line[..idx], line[idx..].trim_start())),
        None => Some((line, "")),
    }
}
