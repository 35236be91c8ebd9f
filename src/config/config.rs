//! `config.toml`: prompt, file locations, history and transcript settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::profile::ProfileRegistry;

/// Directory under the home directory holding every default path
pub const APP_DIR: &str = ".pbx";

/// Everything `config.toml` can set. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfiguration {
    /// `[shell]`
    #[serde(default)]
    pub shell: ShellConfig,
    /// `[paths]`
    #[serde(default)]
    pub paths: PathsConfig,
    /// `[history]`
    #[serde(default)]
    pub history: HistoryConfig,
    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prompt and banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Command prompt
    pub prompt: String,
    /// Banner printed once at start-up
    pub intro: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "pbx> ".to_string(),
            intro: "PayloadBuilder X. Type 'help' for commands, 'exit' to quit.".to_string(),
        }
    }
}

/// Filesystem locations. Every value may start with `~`.
///
/// `output_dir` is the base that relative `output_path` option values are
/// resolved against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Append-only history log
    pub history_file: String,
    /// Directory of named saved configurations
    pub configs_dir: String,
    /// Base for relative `output_path` values
    pub output_dir: String,
    /// Directory whose `blocks`, `addons` and `plugins` folders `scan` lists
    pub scan_root: String,
    /// TOML profile definitions replacing the built-in profiles
    pub profiles_file: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            history_file: format!("~/{}/history.txt", APP_DIR),
            configs_dir: format!("~/{}/configs", APP_DIR),
            output_dir: ".".to_string(),
            scan_root: format!("~/{}", APP_DIR),
            profiles_file: None,
        }
    }
}

/// History log behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Record build attempts at all
    pub enabled: bool,
    /// Entries shown by a bare `history`
    pub default_tail: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_tail: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Markdown transcript; none is written when unset
    pub log_file: Option<String>,
    /// Level for stderr logging and the transcript header
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: "INFO".to_string(),
        }
    }
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// A parsed configuration and the file it was read from
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// Where the configuration was (or would have been) read from
    pub config_path: PathBuf,
    /// Parsed values
    pub config: ShellConfiguration,
}

impl ConfigurationLoader {
    /// Read `config_path`, or `~/.pbx/config.toml` when `None`.
    ///
    /// A missing file is not an error; it yields the defaults.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_config_path);

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            debug!(path = %config_path.display(), "no config file, using defaults");
            ShellConfiguration::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed configuration.
    pub fn from_config(config: ShellConfiguration) -> Self {
        Self {
            config_path: Self::default_config_path(),
            config,
        }
    }

    /// `~/.pbx/config.toml`, or `./.pbx/config.toml` without a home directory
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    fn load_config(path: &Path) -> Result<ShellConfiguration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in config {}", path.display()))
    }

    /// History log path, tilde expanded
    pub fn history_path(&self) -> PathBuf {
        expand_path(&self.config.paths.history_file)
    }

    /// Saved configuration directory, tilde expanded
    pub fn configs_dir(&self) -> PathBuf {
        expand_path(&self.config.paths.configs_dir)
    }

    /// Base directory for build output
    pub fn output_dir(&self) -> PathBuf {
        expand_path(&self.config.paths.output_dir)
    }

    /// Root searched by `scan`
    pub fn scan_root(&self) -> PathBuf {
        expand_path(&self.config.paths.scan_root)
    }

    /// Transcript path, if one is configured
    pub fn log_file(&self) -> Option<PathBuf> {
        self.config.logging.log_file.as_deref().map(expand_path)
    }

    /// The configured profile registry, or the built-in one.
    pub fn registry(&self) -> Result<ProfileRegistry> {
        match self.config.paths.profiles_file.as_deref() {
            Some(raw) => {
                let path = expand_path(raw);
                ProfileRegistry::load(&path)
                    .with_context(|| format!("Failed to load profiles: {}", path.display()))
            }
            None => Ok(ProfileRegistry::builtin()),
        }
    }
}
