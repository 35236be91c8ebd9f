//! Smaller commands: `reset`, `clear`, `version`, `help`, `scan`, `wizard`
//! and `exit`.

use colored::*;
use std::fs;
use std::sync::Arc;

use crate::cli::adapters::Prompter;
use crate::cli::dispatcher::{self, COMMANDS};
use crate::cli::error::{CliError, CliResult};
use crate::cli::shell::{Flow, Shell};
use crate::cli::utils::{commands_table, values_table};
use crate::completion::SCAN_TARGETS;
use crate::error::PbxError;
use crate::history::EntryStatus;
use crate::lexer::split_words_lenient;
use crate::profile::{ProfileRegistry, PAYLOAD_TYPE};
use crate::session::Session;

const SCAN_USAGE: &str = "scan blocks|addons|plugins";

/// Clear every option, including `payload_type`.
pub fn reset(shell: &mut Shell, _prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    shell.session.reset();
    shell.console.success("Configuration cleared.");
    Ok(Flow::Continue)
}

/// Clear the terminal.
pub fn clear(shell: &mut Shell, _prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    shell.console.clear_screen();
    Ok(Flow::Continue)
}

/// Print the program version.
pub fn version(shell: &mut Shell, _prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    shell
        .console
        .print(&format!("PayloadBuilder X v{}", env!("CARGO_PKG_VERSION")));
    Ok(Flow::Continue)
}

/// `help` with no topic lists the commands; a topic may be a command or an
/// option name.
pub fn help(shell: &mut Shell, _prompter: &mut dyn Prompter, args: &str) -> CliResult<Flow> {
    let topic = args.trim().to_lowercase();
    if topic.is_empty() {
        shell.console.print(&commands_table(COMMANDS).to_string());
        shell
            .console
            .print("Type 'help COMMAND' or 'help OPTION' for details.");
        return Ok(Flow::Continue);
    }

    if let Some(command) = dispatcher::lookup(&topic) {
        shell
            .console
            .print(&format!("{} - {}", command.name.cyan(), command.summary));
        shell.console.print(&format!("Usage: {}", command.usage));
        return Ok(Flow::Continue);
    }

    if shell.registry.known_options().contains(&topic.as_str()) {
        let spec = shell.registry.option_spec(&topic);
        shell
            .console
            .print(&format!("{}: {}", spec.name.cyan(), spec.description));
        match values_table(&spec) {
            Some(table) => shell.console.print(&table.to_string()),
            None => shell.console.print("Accepts free text."),
        }
        return Ok(Flow::Continue);
    }

    Err(CliError::UnknownTopic(topic))
}

/// List what is installed under `<scan_root>/<target>`
pub fn scan(shell: &mut Shell, _prompter: &mut dyn Prompter, args: &str) -> CliResult<Flow> {
    let words = split_words_lenient(args);
    let target = match words.as_slice() {
        [target] if SCAN_TARGETS.contains(&target.as_str()) => target.as_str(),
        _ => return Err(PbxError::usage(SCAN_USAGE).into()),
    };

    let dir = shell.settings.scan_root.join(target);
    let mut names: Vec<String> = match fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    names.sort();

    if names.is_empty() {
        shell
            .console
            .warn(&format!("No {} found in {}.", target, dir.display()));
        return Ok(Flow::Continue);
    }

    shell
        .console
        .info(&format!("Available {} ({}):", target, names.len()));
    for name in &names {
        shell.console.print(&format!("    - {}", name));
    }
    Ok(Flow::Continue)
}

/// Walk the operator through `payload_type` and every missing required
/// option. Works on a copy; the live session only changes on completion.
pub fn wizard(shell: &mut Shell, prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    let registry = Arc::clone(&shell.registry);
    let mut trial = shell.session.clone();

    if trial.payload_type().is_none() {
        let choices = registry.list_profiles().join(", ");
        let question = format!("[?] {} ({}): ", PAYLOAD_TYPE, choices);
        ask_until_valid(shell, prompter, &registry, &mut trial, PAYLOAD_TYPE, &question)?;
    }

    let profile = trial.active_profile(&registry)?;
    let missing = trial.missing_required(profile);
    if missing.is_empty() {
        shell.console.info("Every required option already has a value.");
    }

    for option in &missing {
        let spec = registry.option_spec(option);
        let question = if spec.is_free_text() {
            format!("[?] {} ({}): ", option, spec.description)
        } else {
            format!("[?] {} [{}]: ", option, spec.values().join("/"))
        };
        ask_until_valid(shell, prompter, &registry, &mut trial, option, &question)?;
    }

    shell.session = trial;
    shell
        .console
        .success("All required options are set. Type 'build' when ready.");
    Ok(Flow::Continue)
}

fn ask_until_valid(
    shell: &Shell,
    prompter: &mut dyn Prompter,
    registry: &ProfileRegistry,
    trial: &mut Session,
    option: &str,
    question: &str,
) -> CliResult<()> {
    loop {
        let answer = prompter.ask(question)?;
        let answer = answer.trim();
        if answer.is_empty() {
            shell.console.warn(&format!("{} needs a value.", option));
            continue;
        }
        match trial.set_option(registry, option, answer) {
            Ok(()) => return Ok(()),
            Err(e) => shell.console.error(&e.to_string()),
        }
    }
}

/// Leave the shell. A session with a payload type that never reached
/// history is recorded as FAIL first.
pub fn exit(shell: &mut Shell, _prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    if shell.session.payload_type().is_some() && !shell.session.is_recorded() {
        if let Some(serial) = shell.record(EntryStatus::Fail) {
            shell.console.info(&format!(
                "Unfinished session recorded as history entry #{} ({}).",
                serial,
                EntryStatus::Fail
            ));
        }
    }
    shell.console.print("Bye!");
    Ok(Flow::Exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_utils::{shell_in, ScriptedPrompter};
    use tempfile::TempDir;

    #[test]
    fn test_reset_clears_session() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, console, _) = shell_in(tmp.path());
        let mut prompter = ScriptedPrompter::default();
        shell.execute_line("set payload_type downloader, platform linux", &mut prompter);

        reset(&mut shell, &mut prompter, "").unwrap();
        assert!(shell.session().config().is_empty());
        assert!(console.contains("Configuration cleared."));

        shell.execute_line("set payload_type reverse_shell", &mut prompter);
        assert_eq!(shell.session().payload_type(), Some("reverse_shell"));
    }

    #[test]
    fn test_clear_and_version() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, console, _) = shell_in(tmp.path());
        let mut prompter = ScriptedPrompter::default();

        clear(&mut shell, &mut prompter, "").unwrap();
        version(&mut shell, &mut prompter, "").unwrap();
        assert_eq!(console.with_prefix("[CLEAR]").len(), 1);
        assert!(console.contains(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn test_help_topics() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, console, _) = shell_in(tmp.path());
        let mut prompter = ScriptedPrompter::default();

        help(&mut shell, &mut prompter, "").unwrap();
        assert!(console.contains("wizard"));

        console.clear();
        help(&mut shell, &mut prompter, "HISTORY").unwrap();
        assert!(console.contains("Usage: history [all"));

        console.clear();
        help(&mut shell, &mut prompter, "platform").unwrap();
        let lines = console.get_lines();
        assert!(lines.iter().any(|l| l.contains("macos") && l.contains("Linux distributions")));

        console.clear();
        help(&mut shell, &mut prompter, "payload_type").unwrap();
        assert!(console.contains("reverse_shell"));

        let err = help(&mut shell, &mut prompter, "teleport").unwrap_err();
        assert_eq!(err.to_string(), "No help available for 'teleport'.");
    }

    #[test]
    fn test_scan_lists_sorted_entries() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, console, _) = shell_in(tmp.path());
        let mut prompter = ScriptedPrompter::default();

        scan(&mut shell, &mut prompter, "plugins").unwrap();
        assert!(console.contains("No plugins found"));

        let addons = tmp.path().join("addons");
        fs::create_dir_all(&addons).unwrap();
        fs::write(addons.join("zeta.toml"), "").unwrap();
        fs::write(addons.join("alpha.toml"), "").unwrap();

        console.clear();
        scan(&mut shell, &mut prompter, "addons").unwrap();
        let lines = console.get_lines();
        assert_eq!(lines[0], "[INFO] Available addons (2):");
        assert_eq!(lines[1], "    - alpha.toml");
        assert_eq!(lines[2], "    - zeta.toml");

        assert!(scan(&mut shell, &mut prompter, "").is_err());
        assert!(scan(&mut shell, &mut prompter, "secrets").is_err());
    }

    #[test]
    fn test_wizard_fills_required_options() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, console, _) = shell_in(tmp.path());
        let mut prompter = ScriptedPrompter::answers(&[
            "bogus",
            "reverse_shell",
            "10.0.0.5",
            "",
            "99999",
            "4444",
            "linux",
            "python",
        ]);

        wizard(&mut shell, &mut prompter, "").unwrap();
        assert_eq!(prompter.remaining(), 0);

        let config = shell.session().config();
        assert_eq!(config.payload_type(), Some("reverse_shell"));
        assert_eq!(config.get("ip"), Some("10.0.0.5"));
        assert_eq!(config.get("port"), Some("4444"));
        assert_eq!(config.get("platform"), Some("linux"));
        assert_eq!(config.get("language"), Some("python"));
        assert!(console.contains("Unknown payload_type 'bogus'."));
        assert!(console.contains("port needs a value."));
    }

    #[test]
    fn test_wizard_interrupt_leaves_session_untouched() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, _, _) = shell_in(tmp.path());
        shell.execute_line("set payload_type reverse_shell", &mut ScriptedPrompter::default());
        let before = shell.session().config().clone();

        let mut prompter = ScriptedPrompter::new(vec![Some("10.0.0.5"), None]);
        let err = wizard(&mut shell, &mut prompter, "").unwrap_err();
        assert!(err.is_abort());
        assert_eq!(shell.session().config(), &before);
    }

    #[test]
    fn test_exit_records_unfinished_session_once() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, _, _) = shell_in(tmp.path());
        let mut prompter = ScriptedPrompter::default();

        assert_eq!(exit(&mut shell, &mut prompter, "").unwrap(), Flow::Exit);
        assert!(!shell.history().exists());

        shell.execute_line("set payload_type downloader", &mut prompter);
        exit(&mut shell, &mut prompter, "").unwrap();
        exit(&mut shell, &mut prompter, "").unwrap();

        let lines = shell.history().all().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("1. payload_type=downloader timestamp="));
        assert!(lines[0].ends_with(" FAIL"));
    }
}
