//! Mock implementations of adapter traits for testing

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::cli::adapters::{Console, Prompter, Renderer};
use crate::cli::error::{CliError, CliResult};
use crate::cli::runner::{Input, LineSource};
use crate::session::SessionConfig;

/// Console that records every line it is given.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// shell owns another.
#[derive(Clone, Default)]
pub struct MockConsole {
    /// Shared buffer of everything printed
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl MockConsole {
    /// Console with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }

    /// Copy of every recorded line
    pub fn get_lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// True if any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }

    /// Recorded lines with the given prefix, such as `[ERROR]`
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl Console for MockConsole {
    fn print(&self, text: &str) {
        self.push(text.to_string());
    }

    fn info(&self, message: &str) {
        self.push(format!("[INFO] {}", message));
    }

    fn success(&self, message: &str) {
        self.push(format!("[OK] {}", message));
    }

    fn warn(&self, message: &str) {
        self.push(format!("[WARN] {}", message));
    }

    fn error(&self, message: &str) {
        self.push(format!("[ERROR] {}", message));
    }

    fn clear_screen(&self) {
        self.push("[CLEAR]".to_string());
    }
}

/// Prompter that replays queued answers. `None` entries, and reads past the
/// end of the script, act as an interrupt.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    /// Script of answers; `None` is an interrupt
    pub fn new(answers: Vec<Option<&str>>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|a| a.map(str::to_string))
                .collect(),
            prompts: Vec::new(),
        }
    }

    /// Script made only of typed answers
    pub fn answers(answers: &[&str]) -> Self {
        Self::new(answers.iter().map(|a| Some(*a)).collect())
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> CliResult<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().flatten())
    }
}

/// At the command prompt a `None` entry is Ctrl-C and the end of the script
/// is end of input.
impl LineSource for ScriptedPrompter {
    fn next_line(&mut self, prompt: &str) -> CliResult<Input> {
        self.prompts.push(prompt.to_string());
        Ok(match self.answers.pop_front() {
            Some(Some(line)) => Input::Line(line),
            Some(None) => Input::Interrupted,
            None => Input::Eof,
        })
    }
}

/// Renderer that records each spec it is asked to render
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    /// Specs passed to `render`, in order
    pub rendered: Arc<Mutex<Vec<SessionConfig>>>,
    /// Fail every render after recording it
    pub fail: bool,
}

impl RecordingRenderer {
    /// Renderer that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Copy of every rendered spec
    pub fn get_rendered(&self) -> Vec<SessionConfig> {
        self.rendered.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn extension(&self, _spec: &SessionConfig) -> String {
        "txt".to_string()
    }

    fn render(&self, spec: &SessionConfig) -> CliResult<Vec<u8>> {
        self.rendered.lock().unwrap().push(spec.clone());
        if self.fail {
            return Err(CliError::RenderError("renderer unavailable".to_string()));
        }
        let body: Vec<String> = spec.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        Ok(body.join("\n").into_bytes())
    }
}
