//! End-to-end sessions driven through `Shell::execute_line`.

use pbx::cli::test_utils::{shell_in, ScriptedPrompter};
use pbx::cli::Flow;
use pbx::history::HistoryEntry;
use tempfile::TempDir;

fn run_lines(shell: &mut pbx::cli::Shell, lines: &[&str]) -> Flow {
    let mut prompter = ScriptedPrompter::default();
    let mut flow = Flow::Continue;
    for line in lines {
        flow = shell.execute_line(line, &mut prompter);
    }
    flow
}

#[test]
fn test_build_then_exit_records_single_success() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, console, renderer) = shell_in(tmp.path());

    let flow = run_lines(
        &mut shell,
        &[
            "set payload_type reverse_shell",
            "set ip 10.0.0.5",
            "set port 4444",
            "set platform linux",
            "set language python",
            "build",
            "exit",
        ],
    );
    assert_eq!(flow, Flow::Exit);
    assert_eq!(renderer.get_rendered().len(), 1);
    assert!(console.contains("Recorded as history entry #1 (SUCCESS)."));
    assert!(console.contains("Bye!"));

    let lines = shell.history().all().unwrap();
    assert_eq!(lines.len(), 1);
    let entry = HistoryEntry::parse(&lines[0]).unwrap();
    assert_eq!(entry.serial, 1);
    let keys: Vec<&str> = entry.fields.keys().collect();
    assert_eq!(keys, vec!["payload_type", "ip", "port", "platform", "language"]);
}

#[test]
fn test_abandoned_session_recorded_as_fail() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, _, _) = shell_in(tmp.path());

    run_lines(&mut shell, &["set payload_type downloader", "quit"]);

    let lines = shell.history().all().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("1. payload_type=downloader timestamp="));
    assert!(lines[0].ends_with(" FAIL"));
}

#[test]
fn test_restore_and_rebuild() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, _, renderer) = shell_in(tmp.path());

    run_lines(
        &mut shell,
        &[
            "set payload_type downloader, platform macos, language bash",
            "set download_url https://example.test/pkg?x=1",
            "build",
            "reset",
            "set history 1",
            "build",
        ],
    );

    let rendered = renderer.get_rendered();
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0], rendered[1]);
    assert_eq!(shell.history().len().unwrap(), 2);
    assert_eq!(
        shell.session().config().get("download_url"),
        Some("https://example.test/pkg?x=1")
    );
}

#[test]
fn test_profile_cannot_change_without_reset() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, console, _) = shell_in(tmp.path());

    run_lines(
        &mut shell,
        &["set payload_type downloader", "set payload_type reverse_shell"],
    );
    assert_eq!(shell.session().payload_type(), Some("downloader"));
    assert_eq!(console.with_prefix("[ERROR]").len(), 1);

    run_lines(&mut shell, &["reset", "set payload_type reverse_shell"]);
    assert_eq!(shell.session().payload_type(), Some("reverse_shell"));
}

#[test]
fn test_fuzzy_command_confirmation() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, console, _) = shell_in(tmp.path());

    let mut prompter = ScriptedPrompter::answers(&[""]);
    shell.execute_line("sett payload_type downloader", &mut prompter);
    assert_eq!(shell.session().payload_type(), Some("downloader"));
    assert_eq!(prompter.prompts(), &["[~] Did you mean 'set'? (enter/n): ".to_string()]);

    let mut prompter = ScriptedPrompter::answers(&["n"]);
    shell.execute_line("rest", &mut prompter);
    assert_eq!(shell.session().payload_type(), Some("downloader"));
    assert!(console.contains("Unknown command: rest"));

    let mut prompter = ScriptedPrompter::new(vec![None]);
    shell.execute_line("rest", &mut prompter);
    assert_eq!(shell.session().payload_type(), Some("downloader"));
    assert!(console.contains("Cancelled."));

    let mut prompter = ScriptedPrompter::default();
    shell.execute_line("xyzzy", &mut prompter);
    assert!(prompter.prompts().is_empty());
    assert!(console.contains("Unknown command: xyzzy"));
}

#[test]
fn test_history_find_and_clear() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, console, _) = shell_in(tmp.path());

    run_lines(
        &mut shell,
        &[
            "set payload_type reverse_shell, ip 10.0.0.5",
            "build",
            "reset",
            "set payload_type downloader, platform linux",
            "build",
        ],
    );
    assert_eq!(shell.history().len().unwrap(), 2);

    console.clear();
    run_lines(&mut shell, &["history find payload_type downloader"]);
    let shown: Vec<String> = console
        .get_lines()
        .into_iter()
        .filter(|l| l.starts_with("2. "))
        .collect();
    assert_eq!(shown.len(), 1);

    let mut prompter = ScriptedPrompter::answers(&["yes"]);
    shell.execute_line("history clear", &mut prompter);
    assert!(shell.history().is_empty().unwrap());
    assert!(console.contains("History cleared."));

    // the next record starts numbering again
    run_lines(&mut shell, &["set platform macos", "exit"]);
    assert!(shell.history().all().unwrap()[0].starts_with("1. "));
}

#[test]
fn test_config_save_load_and_wizard() {
    let tmp = TempDir::new().unwrap();
    let (mut shell, console, renderer) = shell_in(tmp.path());

    let mut prompter = ScriptedPrompter::answers(&["downloader", "linux", "python", "https://a.test/x"]);
    shell.execute_line("wizard", &mut prompter);
    assert_eq!(prompter.remaining(), 0);
    assert!(console.contains("All required options are set."));

    run_lines(&mut shell, &["config save dl", "reset", "config load dl", "build"]);
    let rendered = renderer.get_rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].get("download_url"), Some("https://a.test/x"));
    assert_eq!(rendered[0].get("execute_after_download"), Some("true"));
}
