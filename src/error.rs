//! Error types for the configuration shell core

use thiserror::Error;

/// Result type for core shell operations
pub type PbxResult<T> = Result<T, PbxError>;

/// Broad classification used when reporting an error to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown profile/option or a payload_type ordering violation
    Schema,
    /// Value outside its allowed set or failing a semantic rule
    Validation,
    /// Missing or corrupt history log / saved config
    Persistence,
    /// Declined confirmation or interrupt during a prompt
    UserAbort,
}

/// Errors produced by the profile, session, and history layers
#[derive(Error, Debug)]
pub enum PbxError {
    /// No profile with this name
    #[error("Unknown payload_type '{name}'.")]
    UnknownProfile { name: String },

    /// payload_type can only be chosen once per session
    #[error("payload_type is already set to '{current}'. Use 'reset' to start over.")]
    ProfileAlreadySet { current: String },

    /// An option was set before payload_type
    #[error("Please set payload_type first.")]
    NoProfileSelected,

    /// The option is not part of the active profile
    #[error("Unknown option '{option}' for payload_type '{profile}'.")]
    UnknownOption { option: String, profile: String },

    /// The value is outside the option's allowed set
    #[error("Invalid value '{value}' for {option}. Allowed: {allowed}")]
    InvalidValue {
        option: String,
        value: String,
        allowed: String,
    },

    /// Semantic rules rejected the trial mapping
    #[error("{}", errors.first().map(String::as_str).unwrap_or("validation failed"))]
    Validation { errors: Vec<String> },

    /// Malformed command arguments
    #[error("Usage: {usage}")]
    Usage { usage: String },

    /// No history line carries this serial
    #[error("No history entry with serial {serial}.")]
    NoSuchSerial { serial: u32 },

    /// A history line that cannot be parsed or restored
    #[error("Malformed history entry {serial}: {reason}")]
    MalformedEntry { serial: u32, reason: String },

    /// No saved config with this name
    #[error("Config '{name}' not found.")]
    ConfigNotFound { name: String },

    /// A saved config that is not a JSON object of strings
    #[error("Config '{name}' is corrupt: {message}")]
    CorruptConfig { name: String, message: String },

    /// Saved config names are limited to `[A-Za-z0-9_-]+`
    #[error("Invalid name '{name}': only letters, digits, '-' and '_' are allowed.")]
    InvalidName { name: String },

    /// Ill-formed profile definitions
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// Filesystem failure with context
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The operator declined or interrupted a prompt
    #[error("Cancelled.")]
    UserAbort,
}

impl PbxError {
    /// Create a validation error from the accumulated rule violations
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    /// Create a usage error
    pub fn usage<S: Into<String>>(usage: S) -> Self {
        Self::Usage {
            usage: usage.into(),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a registry definition error
    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create a malformed-entry error for the given serial
    pub fn malformed<S: Into<String>>(serial: u32, reason: S) -> Self {
        Self::MalformedEntry {
            serial,
            reason: reason.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PbxError::UnknownProfile { .. }
            | PbxError::ProfileAlreadySet { .. }
            | PbxError::NoProfileSelected
            | PbxError::UnknownOption { .. }
            | PbxError::Registry { .. } => ErrorKind::Schema,
            PbxError::InvalidValue { .. }
            | PbxError::Validation { .. }
            | PbxError::Usage { .. }
            | PbxError::InvalidName { .. } => ErrorKind::Validation,
            PbxError::NoSuchSerial { .. }
            | PbxError::MalformedEntry { .. }
            | PbxError::ConfigNotFound { .. }
            | PbxError::CorruptConfig { .. }
            | PbxError::Storage { .. }
            | PbxError::Io(_) => ErrorKind::Persistence,
            PbxError::UserAbort => ErrorKind::UserAbort,
        }
    }

    /// Check if the session can simply carry on after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PbxError::Io(_))
    }
}
