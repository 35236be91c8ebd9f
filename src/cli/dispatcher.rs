//! Command table and dispatch.
//!
//! Commands are looked up case-insensitively by exact name. A miss is
//! offered the closest known name (Jaro-Winkler similarity above
//! [`SIMILARITY_FLOOR`]) and runs it only after the operator confirms.

use crate::cli::adapters::Prompter;
use crate::cli::commands;
use crate::cli::error::{CliError, CliResult};
use crate::cli::shell::{Flow, Shell};

/// Signature shared by every command handler
pub type Handler = fn(&mut Shell, &mut dyn Prompter, &str) -> CliResult<Flow>;

/// One entry of the command table
pub struct CommandSpec {
    /// Lower-case command word
    pub name: &'static str,
    /// One line for the `help` table
    pub summary: &'static str,
    /// Argument synopsis
    pub usage: &'static str,
    /// Function run for the command
    pub handler: Handler,
}

/// Suggestions scoring below this are not offered
pub const SIMILARITY_FLOOR: f64 = 0.8;

/// Every command, in `help` order
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "set",
        summary: "Set one or more options.",
        usage: "set OPTION VALUE[, OPTION VALUE...] | set history SERIAL",
        handler: commands::set::run,
    },
    CommandSpec {
        name: "list",
        summary: "Show the current configuration and which values are required.",
        usage: "list",
        handler: commands::list::run,
    },
    CommandSpec {
        name: "reset",
        summary: "Clear all current values and start fresh.",
        usage: "reset",
        handler: commands::misc::reset,
    },
    CommandSpec {
        name: "clear",
        summary: "Clear the terminal screen.",
        usage: "clear",
        handler: commands::misc::clear,
    },
    CommandSpec {
        name: "build",
        summary: "Build from the current configuration and record the attempt.",
        usage: "build",
        handler: commands::build::run,
    },
    CommandSpec {
        name: "scan",
        summary: "List available building blocks, addons, or plugins.",
        usage: "scan blocks|addons|plugins",
        handler: commands::misc::scan,
    },
    CommandSpec {
        name: "config",
        summary: "Save or load a named configuration.",
        usage: "config save NAME | config load NAME",
        handler: commands::config::run,
    },
    CommandSpec {
        name: "wizard",
        summary: "Answer questions until every required option is set.",
        usage: "wizard",
        handler: commands::misc::wizard,
    },
    CommandSpec {
        name: "history",
        summary: "Browse, search, or clear the build history.",
        usage: "history [all | find KEY VALUE | show top|bottom N | clear]",
        handler: commands::history::run,
    },
    CommandSpec {
        name: "version",
        summary: "Show version information.",
        usage: "version",
        handler: commands::misc::version,
    },
    CommandSpec {
        name: "help",
        summary: "Show help for commands or options.",
        usage: "help [COMMAND|OPTION]",
        handler: commands::misc::help,
    },
    CommandSpec {
        name: "exit",
        summary: "Exit the shell.",
        usage: "exit",
        handler: commands::misc::exit,
    },
    CommandSpec {
        name: "quit",
        summary: "Alias for exit.",
        usage: "quit",
        handler: commands::misc::exit,
    },
];

/// Every command name, in table order
pub fn command_names() -> Vec<&'static str> {
    COMMANDS.iter().map(|c| c.name).collect()
}

/// Exact, case-insensitive lookup
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Closest command to a mistyped name, if any is similar enough
pub fn closest(name: &str) -> Option<&'static CommandSpec> {
    let name = name.to_lowercase();
    COMMANDS
        .iter()
        .map(|c| (c, strsim::jaro_winkler(&name, c.name)))
        .filter(|(_, score)| *score >= SIMILARITY_FLOOR)
        .fold(None, |best: Option<(&'static CommandSpec, f64)>, (c, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((c, score)),
        })
        .map(|(c, _)| c)
}

/// Route `name` to its handler, offering a correction for near misses.
pub fn dispatch(
    shell: &mut Shell,
    prompter: &mut dyn Prompter,
    name: &str,
    args: &str,
) -> CliResult<Flow> {
    if let Some(command) = lookup(name) {
        return (command.handler)(shell, prompter, args);
    }

    let typed = name.to_lowercase();
    let Some(suggestion) = closest(&typed) else {
        return Err(CliError::UnknownCommand(typed));
    };

    let question = format!("[~] Did you mean '{}'? (enter/n): ", suggestion.name);
    if prompter.confirm(&question, true)? {
        (suggestion.handler)(shell, prompter, args)
    } else {
        Err(CliError::UnknownCommand(typed))
    }
}
