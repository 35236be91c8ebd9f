//! Markdown transcript of a shell run.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::history::EntryStatus;
use crate::session::SessionConfig;

/// Logger for shell sessions.
///
/// Writes a markdown file recording when the session started, every command
/// the operator entered with its outcome, every build with the spec it used,
/// and how the session ended.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Open (or start) a transcript.
    ///
    /// # Arguments
    /// * `log_file` - Transcript path. `None` picks a fresh file under
    ///   `<temp>/pbx-logs/`.
    /// * `log_level` - Level recorded in the header, `INFO` when omitted.
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let logger = Self {
            log_file: log_file.map_or_else(Self::fresh_path, Path::to_path_buf),
            log_level: log_level.unwrap_or("INFO").to_uppercase(),
        };

        if let Some(dir) = logger.log_file.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Cannot create transcript directory {}", dir.display())
            })?;
        }
        if !logger.log_file.exists() {
            logger.write_header()?;
        }
        Ok(logger)
    }

    fn fresh_path() -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        std::env::temp_dir()
            .join("pbx-logs")
            .join(format!("session_{}_{}.md", stamp, std::process::id()))
    }

    fn write_header(&self) -> Result<()> {
        let header = format!(
            "# PayloadBuilder X Session Log\n\nLog started: {}\nLevel: {}\n\n---\n\n",
            Self::now(),
            self.log_level
        );
        fs::write(&self.log_file, header)
            .with_context(|| format!("Cannot write transcript {}", self.log_file.display()))
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .and_then(|mut file| file.write_all(content.as_bytes()))
            .with_context(|| format!("Cannot append to transcript {}", self.log_file.display()))
    }

    fn now() -> String {
        let now: DateTime<Local> = Local::now();
        now.to_rfc3339()
    }

    /// Log session start.
    ///
    /// # Arguments
    /// * `history_file` - History log the session appends to.
    /// * `profiles` - Registered payload types.
    pub fn log_session_start(&self, history_file: &Path, profiles: &[&str]) -> Result<()> {
        let content = format!(
            "## Session Started - {}\n\n**History:** `{}`\n**Profiles:** {}\n\n",
            Self::now(),
            history_file.display(),
            profiles.join(", ")
        );

        self.append_to_log(&content)?;
        debug!(history = %history_file.display(), "session started");
        Ok(())
    }

    /// Log one dispatched command and what came of it.
    pub fn log_command(&self, line: &str, outcome: &str) -> Result<()> {
        let content = format!(
            "### Command - {}\n\n**Input:** `{}`\n**Outcome:** {}\n\n",
            Self::now(),
            line,
            outcome
        );
        self.append_to_log(&content)
    }

    /// Log a build attempt.
    ///
    /// # Arguments
    /// * `spec` - Default-merged spec the build used.
    /// * `status` - Recorded history status.
    /// * `serial` - History serial, when the attempt was recorded.
    /// * `output` - Written artifact, if any.
    pub fn log_build(
        &self,
        spec: &SessionConfig,
        status: EntryStatus,
        serial: Option<u32>,
        output: Option<&Path>,
    ) -> Result<()> {
        let mut content = format!(
            "### Build {} - {}\n\n",
            status,
            Self::now()
        );
        if let Some(serial) = serial {
            content.push_str(&format!("**Serial:** {}\n", serial));
        }
        if let Some(output) = output {
            content.push_str(&format!("**Output:** `{}`\n", output.display()));
        }
        content.push_str("\n| Option | Value |\n|---|---|\n");
        for (key, value) in spec.iter() {
            content.push_str(&format!("| {} | {} |\n", key, value));
        }
        content.push('\n');

        self.append_to_log(&content)?;
        debug!(status = %status, ?serial, "build logged");
        Ok(())
    }

    /// Record a failure that did not stop the shell.
    pub fn log_error(&self, error: &str, context: Option<&str>) -> Result<()> {
        let mut content = format!("### Error - {}\n\n**Error:** {}\n\n", Self::now(), error);
        if let Some(context) = context {
            content.push_str(&format!("**Context:** {}\n\n", context));
        }
        self.append_to_log(&content)
    }

    /// Log session end.
    ///
    /// # Arguments
    /// * `reason` - Why the session ended.
    pub fn log_session_end(&self, reason: &str) -> Result<()> {
        let content = format!(
            "### Session Ended - {}\n\n**Reason:** {}\n\n---\n\n",
            Self::now(),
            reason
        );

        self.append_to_log(&content)?;
        debug!(reason, "session ended");
        Ok(())
    }

    /// Transcript path
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

#[cfg(test)]
mod tests;
