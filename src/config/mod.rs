//! Shell configuration loaded from TOML.
//!
//! # Example
//!
//! ```no_run
//! use pbx::config::ConfigurationLoader;
//! use std::path::Path;
//!
//! let loader = ConfigurationLoader::new(Some(Path::new("pbx.toml"))).unwrap();
//! println!("history lives at {}", loader.history_path().display());
//! ```

#[allow(clippy::module_inception)]
pub mod config;

pub use self::config::{
    expand_path, ConfigurationLoader, HistoryConfig, LoggingConfig, PathsConfig, ShellConfig,
    ShellConfiguration, APP_DIR,
};
