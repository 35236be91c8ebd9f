//! `list` command

use colored::*;

use crate::cli::adapters::Prompter;
use crate::cli::error::CliResult;
use crate::cli::shell::{Flow, Shell};
use crate::cli::utils::options_table;

/// Show the active profile's options with their current values.
pub fn run(shell: &mut Shell, _prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    let Some(payload_type) = shell.session.payload_type() else {
        shell
            .console
            .print(&format!("\n--- Payload Type: {} ---\n", "<none>".cyan()));
        shell.console.warn("Please set a payload_type.");
        shell.console.print("    → Use: set payload_type VALUE\n");
        return Ok(Flow::Continue);
    };

    let profile = shell.registry.get_profile(payload_type)?;
    shell
        .console
        .print(&format!("\n--- Payload Type: {} ---\n", payload_type.cyan()));
    shell
        .console
        .print(&options_table(profile, shell.session.config()).to_string());
    shell.console.print("(* required, no value yet)\n");
    Ok(Flow::Continue)
}
