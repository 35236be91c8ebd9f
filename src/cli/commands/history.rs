//! `history` command

use crate::cli::adapters::Prompter;
use crate::cli::error::CliResult;
use crate::cli::shell::{Flow, Shell};
use crate::cli::utils::format_history_line;
use crate::error::PbxError;
use crate::history::{Direction, FindOutcome};
use crate::lexer::split_words_lenient;

const USAGE: &str = "history [all | find KEY VALUE | show top|bottom N | clear]";
const SHOW_USAGE: &str = "history show top|bottom N";
const FIND_USAGE: &str = "history find KEY VALUE";

/// Browse, search or clear the history log.
pub fn run(shell: &mut Shell, prompter: &mut dyn Prompter, args: &str) -> CliResult<Flow> {
    let words = split_words_lenient(args);
    let words: Vec<&str> = words.iter().map(String::as_str).collect();

    match words.as_slice() {
        [] => {
            let n = shell.settings.default_tail;
            let lines = shell.history.tail(n)?;
            show(shell, "", lines);
        }
        ["all"] => {
            let lines = shell.history.all()?;
            show(shell, "", lines);
        }
        ["show", direction, n] => {
            let direction: Direction = direction.parse()?;
            let n: usize = n.parse().map_err(|_| PbxError::usage(SHOW_USAGE))?;
            let lines = shell.history.range(direction, n)?;
            show(shell, &format!("{} ", direction), lines);
        }
        ["show", ..] => return Err(PbxError::usage(SHOW_USAGE).into()),
        ["find", key, value] => find(shell, key, value)?,
        ["find", ..] => return Err(PbxError::usage(FIND_USAGE).into()),
        ["clear"] => clear(shell, prompter)?,
        _ => return Err(PbxError::usage(USAGE).into()),
    }
    Ok(Flow::Continue)
}

fn show(shell: &Shell, label: &str, lines: Vec<String>) {
    if !shell.history.exists() {
        shell.console.warn("No history found.");
        return;
    }
    if lines.is_empty() {
        shell.console.warn("No history entries.");
        return;
    }
    shell
        .console
        .info(&format!("Showing {}{} entries:", label, lines.len()));
    for line in &lines {
        shell.console.print(&format_history_line(line, None));
    }
}

fn find(shell: &Shell, key: &str, value: &str) -> CliResult<()> {
    match shell.history.find(key, value)? {
        FindOutcome::NoHistory => shell.console.warn("No history found."),
        FindOutcome::NoMatches => shell
            .console
            .warn("No matching history entries found."),
        FindOutcome::Found(lines) => {
            let needle = format!("{}={}", key, value);
            shell
                .console
                .info(&format!("Entries with {}:", needle));
            for line in &lines {
                shell
                    .console
                    .print(&format_history_line(line, Some(&needle)));
            }
        }
    }
    Ok(())
}

fn clear(shell: &Shell, prompter: &mut dyn Prompter) -> CliResult<()> {
    if shell.history.is_empty()? {
        shell.console.warn("No history to clear.");
        return Ok(());
    }

    let confirmed =
        prompter.confirm("[?] Are you sure you want to clear history? (yes/no): ", false)?;
    if shell.history.clear_if(|| Ok(confirmed))? {
        shell.console.success("History cleared.");
    } else {
        shell.console.warn("Clear cancelled.");
    }
    Ok(())
}
