//! Append-only build history.
//!
//! Each build attempt (and each abandoned session) becomes one line of a
//! plain text log. Serials are never stored separately: an entry's serial is
//! its 1-based line number, so every writer must derive it from the current
//! line count.

pub mod entry;
pub mod store;

pub use entry::{EntryStatus, HistoryEntry, TIMESTAMP_FORMAT, TIMESTAMP_MARKER};
pub use store::{Direction, FindOutcome, HistoryStore};
