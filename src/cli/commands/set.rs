//! `set` command
//!
//! `set OPTION VALUE[, OPTION VALUE...]` applies assignments left to right
//! and stops at the first one that fails. `set history SERIAL` replaces the
//! whole session with a recorded history entry.

use std::sync::Arc;

use crate::cli::adapters::Prompter;
use crate::cli::error::CliResult;
use crate::cli::shell::{Flow, Shell};
use crate::completion::HISTORY_KEYWORD;
use crate::error::PbxError;
use crate::lexer::split_words_lenient;
use crate::session::parse_assignments;

const RESTORE_USAGE: &str = "set history SERIAL";

/// Assign options, or restore a history entry.
pub fn run(shell: &mut Shell, _prompter: &mut dyn Prompter, args: &str) -> CliResult<Flow> {
    let words = split_words_lenient(args);
    if words
        .first()
        .is_some_and(|w| w.eq_ignore_ascii_case(HISTORY_KEYWORD))
    {
        return restore(shell, &words[1..]);
    }

    let registry = Arc::clone(&shell.registry);
    for assignment in parse_assignments(args)? {
        shell.session.apply(&registry, &assignment)?;
        shell
            .console
            .success(&format!("{} => {}", assignment.option, assignment.value));
    }
    Ok(Flow::Continue)
}

fn restore(shell: &mut Shell, rest: &[String]) -> CliResult<Flow> {
    let serial = match rest {
        [serial] => serial
            .parse::<u32>()
            .map_err(|_| PbxError::usage(RESTORE_USAGE))?,
        _ => return Err(PbxError::usage(RESTORE_USAGE).into()),
    };

    let restored = shell.history.restore(serial)?;
    shell.session.replace(restored);
    shell
        .console
        .success(&format!("Restored history entry #{}.", serial));
    Ok(Flow::Continue)
}
