//! `build` command
//!
//! Checks the session against its profile, merges in the profile defaults,
//! and hands the merged spec to the renderer. Every attempt that gets past
//! the payload_type check is appended to history, SUCCESS or FAIL.

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::adapters::Prompter;
use crate::cli::error::CliResult;
use crate::cli::shell::{Flow, Shell};
use crate::cli::utils::build_summary;
use crate::config::expand_path;
use crate::history::EntryStatus;
use crate::session::{validate_config, SessionConfig};
use crate::storage::AtomicOps;

/// `build_mode` value that skips rendering
pub const DRY_RUN: &str = "dry-run";

/// Validate, render and record the current session.
pub fn run(shell: &mut Shell, _prompter: &mut dyn Prompter, _args: &str) -> CliResult<Flow> {
    let registry = Arc::clone(&shell.registry);
    let profile = shell.session.active_profile(&registry)?;
    let spec = shell.session.snapshot(profile);

    let missing = shell.session.missing_required(profile);
    if !missing.is_empty() {
        shell.console.error(&format!(
            "Missing required option(s): {}",
            missing.join(", ")
        ));
        shell
            .console
            .print("    → Use: set OPTION VALUE   (TAB completes names/values)");
        shell
            .console
            .print("    → Or   list              (see * items that are still blank)");
        finish(shell, &spec, EntryStatus::Fail, None);
        return Ok(Flow::Continue);
    }

    let errors = validate_config(&spec);
    if !errors.is_empty() {
        shell.console.error("Validation error(s):");
        for error in &errors {
            shell.console.print(&format!("    - {}", error));
        }
        shell.console.print("    → Fix with  set OPTION VALUE");
        finish(shell, &spec, EntryStatus::Fail, None);
        return Ok(Flow::Continue);
    }

    let built_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    if spec.get("build_mode") == Some(DRY_RUN) {
        shell
            .console
            .print(&build_summary(profile, &spec, &built_at).to_string());
        shell.console.info("Dry run: nothing was written.");
        finish(shell, &spec, EntryStatus::Success, None);
        return Ok(Flow::Continue);
    }

    shell.console.info("Building …");
    let written = shell
        .renderer
        .render(&spec)
        .and_then(|bytes| {
            let path = artifact_path(&shell.settings.output_dir, &spec, &shell.renderer.extension(&spec));
            AtomicOps::write_file(&path, &bytes)?;
            Ok(path)
        });

    match written {
        Ok(path) => {
            shell
                .console
                .print(&build_summary(profile, &spec, &built_at).to_string());
            shell
                .console
                .success(&format!("Payload saved to: {}", path.display()));
            finish(shell, &spec, EntryStatus::Success, Some(&path));
        }
        Err(e) => {
            shell.console.error(&format!("Build failed: {}", e));
            finish(shell, &spec, EntryStatus::Fail, None);
        }
    }
    Ok(Flow::Continue)
}

/// Record the attempt in history and the transcript
fn finish(shell: &mut Shell, spec: &SessionConfig, status: EntryStatus, output: Option<&Path>) {
    let serial = shell.record(status);
    if let Some(serial) = serial {
        shell
            .console
            .info(&format!("Recorded as history entry #{} ({}).", serial, status));
    }
    shell.transcript(|log| log.log_build(spec, status, serial, output));
}

/// `<output_path>/<filename>.<ext>`, falling back to
/// `<payload_type>_<unix seconds>` when no filename is set. A relative
/// `output_path` is taken relative to `base`.
pub fn artifact_path(base: &Path, spec: &SessionConfig, extension: &str) -> PathBuf {
    let dir = match spec.get("output_path").filter(|p| !p.is_empty()) {
        Some(raw) => {
            let path = expand_path(raw);
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        }
        None => base.to_path_buf(),
    };

    let stem = spec
        .get("filename")
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{}_{}",
                spec.payload_type().unwrap_or("payload"),
                Local::now().timestamp()
            )
        });

    dir.join(format!("{}.{}", stem, extension))
}
