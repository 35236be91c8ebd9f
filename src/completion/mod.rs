//! Context-sensitive completion.
//!
//! [`CompletionContext::complete`] is a pure function of the input line, the
//! cursor offset, and the session state, so it can be exercised without a
//! live line editor.

mod resolver;

pub use resolver::{Completion, CompletionContext};

/// Keyword accepted by `set` to restore a history entry
pub const HISTORY_KEYWORD: &str = "history";

/// First argument of `history`
pub const HISTORY_SUBCOMMANDS: &[&str] = &["all", "find", "show", "clear"];

/// Second argument of `history show`
pub const SHOW_DIRECTIONS: &[&str] = &["top", "bottom"];

/// First argument of `config`
pub const CONFIG_ACTIONS: &[&str] = &["save", "load"];

/// First argument of `scan`
pub const SCAN_TARGETS: &[&str] = &["blocks", "addons", "plugins"];
