//! PayloadBuilder X (pbx) - a profile-driven interactive configuration shell
//!
//! An operator picks a payload profile, fills in its options with validated
//! `set` commands, and runs `build`. Every build attempt, and every session
//! abandoned with a profile selected, lands in an append-only history log
//! that can be searched and replayed into a new session.
//!
//! - **`profile`** - profile schemas and the option catalogue
//! - **`session`** - the live option mapping and its validation rules
//! - **`history`** - the append-only build log
//! - **`completion`** - context-aware tab completion
//! - **`storage`** - atomic writes and named saved configs
//! - **`config`** - TOML configuration loading
//! - **`observability`** - markdown session transcripts
//! - **`cli`** - the interactive shell (enabled with the `cli` feature)
//!
//! # Example
//!
//! ```
//! use pbx::prelude::*;
//!
//! let registry = ProfileRegistry::builtin();
//! let mut session = Session::new();
//! session.set_payload_type(&registry, "reverse_shell").unwrap();
//! session.set_option(&registry, "ip", "10.0.0.5").unwrap();
//!
//! let profile = session.active_profile(&registry).unwrap();
//! assert_eq!(session.missing_required(profile), vec!["port", "platform", "language"]);
//! assert!(session.set_option(&registry, "port", "70000").is_err());
//! ```

#![warn(missing_docs)]

/// Core error type
pub mod error;

/// Quote-aware word and segment splitting
pub mod lexer;

/// Profile schemas
pub mod profile;

/// Session state and validation
pub mod session;

/// Tab-completion resolution
pub mod completion;

/// Build history log
pub mod history;

/// File persistence
pub mod storage;

/// Configuration management
pub mod config;

/// Session transcripts
pub mod observability;

/// Interactive shell (enabled with the `cli` feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigurationLoader, ShellConfiguration};
    pub use crate::error::{PbxError, PbxResult};
    pub use crate::history::{EntryStatus, HistoryEntry, HistoryStore};
    pub use crate::observability::Logger;
    pub use crate::profile::{OptionSpec, Profile, ProfileRegistry};
    pub use crate::session::{validate_config, Session, SessionConfig};
    pub use crate::storage::SavedConfigStore;

    #[cfg(feature = "cli")]
    pub use crate::cli::{Flow, Shell};
}
