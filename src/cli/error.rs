//! Error types for CLI operations

use thiserror::Error;

use crate::error::PbxError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur during CLI command execution
#[derive(Error, Debug)]
pub enum CliError {
    /// Error raised by the session, profile, history, or storage layers
    #[error(transparent)]
    Core(#[from] PbxError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line editor failure other than an interrupt
    #[error("Line editor error: {0}")]
    ReadlineError(#[from] rustyline::error::ReadlineError),

    /// Render collaborator failure
    #[error("Render error: {0}")]
    RenderError(String),

    /// No command matched, not even approximately
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// `help` was asked about something that is neither a command nor an option
    #[error("No help available for '{0}'.")]
    UnknownTopic(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CliError {
    /// True when the operator cancelled a prompt
    pub fn is_abort(&self) -> bool {
        matches!(self, CliError::Core(PbxError::UserAbort))
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::RenderError(err.to_string())
    }
}
