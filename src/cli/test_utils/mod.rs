//! Test utilities and mock implementations for CLI testing
//!
//! Provides mock adapters for driving a [`Shell`](crate::cli::Shell) without
//! a terminal.

pub mod mocks;

pub use mocks::{MockConsole, RecordingRenderer, ScriptedPrompter};

use std::path::Path;
use std::sync::Arc;

use crate::cli::shell::{Shell, ShellSettings};
use crate::history::HistoryStore;
use crate::profile::ProfileRegistry;
use crate::storage::SavedConfigStore;

/// A shell over the built-in profiles with every path inside `dir`, plus
/// handles to its recording console and renderer.
pub fn shell_in(dir: &Path) -> (Shell, MockConsole, RecordingRenderer) {
    let console = MockConsole::new();
    let renderer = RecordingRenderer::new();
    let settings = ShellSettings {
        output_dir: dir.join("out"),
        scan_root: dir.to_path_buf(),
        ..ShellSettings::default()
    };
    let shell = Shell::new(
        Arc::new(ProfileRegistry::builtin()),
        HistoryStore::new(dir.join("history").join("history.txt")),
        SavedConfigStore::new(dir.join("configs")),
        settings,
    )
    .with_console(console.clone())
    .with_renderer(renderer.clone());
    (shell, console, renderer)
}
