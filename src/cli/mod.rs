//! CLI feature - the interactive shell
//!
//! # Architecture
//!
//! The [`Shell`] owns one session and the stores behind it. Commands are
//! plain functions in [`commands`], routed by [`dispatcher`], and talk to the
//! outside world only through the adapter traits:
//! - [`Console`] - where output goes
//! - [`Prompter`] - follow-up questions (confirmations, the wizard)
//! - [`Renderer`] - turns a merged spec into build output
//!
//! [`runner::run`] wires all of it to a rustyline editor.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbx::cli::test_utils::{shell_in, ScriptedPrompter};
//!
//! let (mut shell, console, _) = shell_in(dir.path());
//! shell.execute_line("set payload_type downloader", &mut ScriptedPrompter::default());
//! assert!(console.contains("payload_type => downloader"));
//! ```

pub mod adapters;
pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod helper;
pub mod runner;
pub mod shell;
pub mod utils;

pub mod test_utils;

pub use adapters::{
    is_affirmative, Console, ManifestRenderer, Prompter, Renderer, TerminalConsole,
};
pub use dispatcher::{CommandSpec, COMMANDS};
pub use error::{CliError, CliResult};
pub use helper::PbxHelper;
pub use runner::{drive, run, Input, LineSource};
pub use shell::{split_command, Flow, Shell, ShellSettings};
