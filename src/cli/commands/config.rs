//! `config save NAME` / `config load NAME`

use crate::cli::adapters::Prompter;
use crate::cli::error::CliResult;
use crate::cli::shell::{Flow, Shell};
use crate::error::PbxError;
use crate::lexer::split_words_lenient;

const USAGE: &str = "config save NAME | config load NAME";

/// Save the session under a name, or replace it with a saved one.
pub fn run(shell: &mut Shell, _prompter: &mut dyn Prompter, args: &str) -> CliResult<Flow> {
    let words = split_words_lenient(args);
    let words: Vec<&str> = words.iter().map(String::as_str).collect();

    match words.as_slice() {
        ["save", name] => save(shell, name),
        ["load", name] => load(shell, name),
        _ => Err(PbxError::usage(USAGE).into()),
    }
}

fn save(shell: &mut Shell, name: &str) -> CliResult<Flow> {
    if shell.session.payload_type().is_none() {
        return Err(PbxError::NoProfileSelected.into());
    }
    let path = shell.saved.save(name, shell.session.config())?;
    shell
        .console
        .success(&format!("Configuration '{}' saved to {}", name, path.display()));
    Ok(Flow::Continue)
}

fn load(shell: &mut Shell, name: &str) -> CliResult<Flow> {
    // Nothing changes unless the whole file checks out.
    let loaded = shell.saved.load(name, &shell.registry)?;
    let payload_type = loaded.payload_type().unwrap_or_default().to_string();
    shell.session.replace(loaded);
    shell.console.success(&format!(
        "Configuration '{}' loaded (payload_type={}).",
        name, payload_type
    ));
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_utils::{shell_in, ScriptedPrompter};
    use crate::cli::CliError;
    use tempfile::TempDir;

    fn config(shell: &mut Shell, args: &str) -> CliResult<Flow> {
        run(shell, &mut ScriptedPrompter::default(), args)
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, console, _) = shell_in(tmp.path());
        shell.execute_line(
            "set payload_type reverse_shell, ip 10.0.0.5, port 4444",
            &mut ScriptedPrompter::default(),
        );
        let saved = shell.session().config().clone();

        config(&mut shell, "save office").unwrap();
        assert!(tmp.path().join("configs").join("office.json").exists());

        shell.execute_line("reset", &mut ScriptedPrompter::default());
        assert!(shell.session().config().is_empty());

        config(&mut shell, "load office").unwrap();
        assert_eq!(shell.session().config(), &saved);
        assert!(console.contains("loaded (payload_type=reverse_shell)"));
    }

    #[test]
    fn test_save_requires_payload_type() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, _, _) = shell_in(tmp.path());
        let err = config(&mut shell, "save empty").unwrap_err();
        assert!(matches!(err, CliError::Core(PbxError::NoProfileSelected)));
    }

    #[test]
    fn test_failed_load_keeps_session() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, _, _) = shell_in(tmp.path());
        shell.execute_line("set payload_type downloader", &mut ScriptedPrompter::default());
        let before = shell.session().config().clone();

        let err = config(&mut shell, "load missing").unwrap_err();
        assert!(matches!(err, CliError::Core(PbxError::ConfigNotFound { .. })));

        std::fs::create_dir_all(tmp.path().join("configs")).unwrap();
        std::fs::write(tmp.path().join("configs").join("broken.json"), "{ not json").unwrap();
        let err = config(&mut shell, "load broken").unwrap_err();
        assert!(matches!(err, CliError::Core(PbxError::CorruptConfig { .. })));

        let err = config(&mut shell, "load ../etc").unwrap_err();
        assert!(matches!(err, CliError::Core(PbxError::InvalidName { .. })));

        assert_eq!(shell.session().config(), &before);
    }

    #[test]
    fn test_usage() {
        let tmp = TempDir::new().unwrap();
        let (mut shell, _, _) = shell_in(tmp.path());
        for args in ["", "save", "drop x", "load a b"] {
            let err = config(&mut shell, args).unwrap_err();
            assert_eq!(err.to_string(), format!("Usage: {}", USAGE));
        }
    }
}
